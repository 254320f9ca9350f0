//! Network policies.

use serde::Deserialize;

use super::common::Like;
use crate::client::Client;
use crate::core::identifier::{AccountObjectIdentifier, ObjectIdentifier, SchemaObjectIdentifier};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_lenient_int, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

const RULE_LIST: Modifiers = Modifiers::EQUALS.parentheses();
const IP_LIST: Modifiers = Modifiers::SINGLE_QUOTED.parentheses();

fn rule_list<'a>(
    literal: &'static str,
    rules: Option<&'a [SchemaObjectIdentifier]>,
) -> Field<'a> {
    Field::values(literal, rules, Separator::Comma, RULE_LIST)
}

fn ip_list<'a>(literal: &'static str, ips: Option<&'a [String]>) -> Field<'a> {
    Field::values(literal, ips, Separator::Comma, IP_LIST)
}

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] NETWORK POLICY <name> ...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateNetworkPolicyOptions {
    pub or_replace: Option<bool>,
    pub name: AccountObjectIdentifier,

    pub allowed_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
    pub blocked_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
    pub allowed_ip_list: Option<Vec<String>>,
    pub blocked_ip_list: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl CreateNetworkPolicyOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for CreateNetworkPolicyOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("NETWORK POLICY"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            rule_list(
                "ALLOWED_NETWORK_RULE_LIST",
                self.allowed_network_rule_list.as_deref(),
            ),
            rule_list(
                "BLOCKED_NETWORK_RULE_LIST",
                self.blocked_network_rule_list.as_deref(),
            ),
            ip_list("ALLOWED_IP_LIST", self.allowed_ip_list.as_deref()),
            ip_list("BLOCKED_IP_LIST", self.blocked_ip_list.as_deref()),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

impl Options for CreateNetworkPolicyOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateNetworkPolicyOptions");
        rules.valid_identifier(&self.name);
        validate_rule_lists(
            &mut rules,
            self.allowed_network_rule_list.as_deref(),
            self.blocked_network_rule_list.as_deref(),
        );
        rules.finish()
    }
}

fn validate_rule_lists(
    rules: &mut Rules,
    allowed: Option<&[SchemaObjectIdentifier]>,
    blocked: Option<&[SchemaObjectIdentifier]>,
) {
    if let Some(allowed) = allowed {
        rules.valid_identifiers(allowed);
    }
    if let Some(blocked) = blocked {
        rules.valid_identifiers(blocked);
    }
}

// =============================================================================
// ALTER
// =============================================================================

/// Lists and comment replaced by `ALTER NETWORK POLICY ... SET`. An empty
/// list renders as `()` but does not count as a change on its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkPolicySet {
    pub allowed_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
    pub blocked_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
    pub allowed_ip_list: Option<Vec<String>>,
    pub blocked_ip_list: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl Structure for NetworkPolicySet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            rule_list(
                "ALLOWED_NETWORK_RULE_LIST",
                self.allowed_network_rule_list.as_deref(),
            ),
            rule_list(
                "BLOCKED_NETWORK_RULE_LIST",
                self.blocked_network_rule_list.as_deref(),
            ),
            ip_list("ALLOWED_IP_LIST", self.allowed_ip_list.as_deref()),
            ip_list("BLOCKED_IP_LIST", self.blocked_ip_list.as_deref()),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkPolicyUnset {
    pub allowed_network_rule_list: Option<bool>,
    pub blocked_network_rule_list: Option<bool>,
    pub allowed_ip_list: Option<bool>,
    pub blocked_ip_list: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for NetworkPolicyUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("ALLOWED_NETWORK_RULE_LIST", self.allowed_network_rule_list),
            Field::flag("BLOCKED_NETWORK_RULE_LIST", self.blocked_network_rule_list),
            Field::flag("ALLOWED_IP_LIST", self.allowed_ip_list),
            Field::flag("BLOCKED_IP_LIST", self.blocked_ip_list),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

/// Rules added or removed in place by `ADD` / `REMOVE`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkRuleChange {
    pub allowed_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
    pub blocked_network_rule_list: Option<Vec<SchemaObjectIdentifier>>,
}

impl NetworkRuleChange {
    fn validate(&self, rules: &mut Rules) {
        rules.exactly_one_of(&[
            list("AllowedNetworkRuleList", &self.allowed_network_rule_list),
            list("BlockedNetworkRuleList", &self.blocked_network_rule_list),
        ]);
        validate_rule_lists(
            rules,
            self.allowed_network_rule_list.as_deref(),
            self.blocked_network_rule_list.as_deref(),
        );
    }
}

impl Structure for NetworkRuleChange {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            rule_list(
                "ALLOWED_NETWORK_RULE_LIST",
                self.allowed_network_rule_list.as_deref(),
            ),
            rule_list(
                "BLOCKED_NETWORK_RULE_LIST",
                self.blocked_network_rule_list.as_deref(),
            ),
        ]
    }
}

/// `ALTER NETWORK POLICY [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterNetworkPolicyOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,

    pub set: Option<NetworkPolicySet>,
    pub unset: Option<NetworkPolicyUnset>,
    pub add: Option<NetworkRuleChange>,
    pub remove: Option<NetworkRuleChange>,
    pub rename_to: Option<AccountObjectIdentifier>,
}

impl AlterNetworkPolicyOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterNetworkPolicyOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER NETWORK POLICY"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::record("SET", self.set.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("ADD", self.add.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("REMOVE", self.remove.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::ident("RENAME TO", self.rename_to.as_ref(), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for AlterNetworkPolicyOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterNetworkPolicyOptions");
        rules
            .valid_identifier(&self.name)
            .exactly_one_of(&[
                field("Set", &self.set),
                field("Unset", &self.unset),
                field("Add", &self.add),
                field("Remove", &self.remove),
                field("RenameTo", &self.rename_to),
            ])
            .valid_identifier_if_set(self.rename_to.as_ref());
        if let Some(set) = &self.set {
            rules.nested("Set", |r| {
                r.at_least_one_of(&[
                    list("AllowedNetworkRuleList", &set.allowed_network_rule_list),
                    list("BlockedNetworkRuleList", &set.blocked_network_rule_list),
                    list("AllowedIpList", &set.allowed_ip_list),
                    list("BlockedIpList", &set.blocked_ip_list),
                    field("Comment", &set.comment),
                ]);
                validate_rule_lists(
                    r,
                    set.allowed_network_rule_list.as_deref(),
                    set.blocked_network_rule_list.as_deref(),
                );
            });
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.at_least_one_of(&[
                    field("AllowedNetworkRuleList", &unset.allowed_network_rule_list),
                    field("BlockedNetworkRuleList", &unset.blocked_network_rule_list),
                    field("AllowedIpList", &unset.allowed_ip_list),
                    field("BlockedIpList", &unset.blocked_ip_list),
                    field("Comment", &unset.comment),
                ]);
            });
        }
        if let Some(add) = &self.add {
            rules.nested("Add", |r| add.validate(r));
        }
        if let Some(remove) = &self.remove {
            rules.nested("Remove", |r| remove.validate(r));
        }
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW / DESCRIBE
// =============================================================================

/// `DROP NETWORK POLICY [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropNetworkPolicyOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,
}

impl DropNetworkPolicyOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropNetworkPolicyOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP NETWORK POLICY"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropNetworkPolicyOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropNetworkPolicyOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW NETWORK POLICIES [LIKE ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowNetworkPolicyOptions {
    pub like: Option<Like>,
}

impl Structure for ShowNetworkPolicyOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW NETWORK POLICIES"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowNetworkPolicyOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowNetworkPolicyOptions");
        if let Some(like) = &self.like {
            rules.extend(like.validate());
        }
        rules.finish()
    }
}

#[derive(Debug, Clone, Default)]
struct DescribeNetworkPolicyOptions {
    name: AccountObjectIdentifier,
}

impl Structure for DescribeNetworkPolicyOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DESCRIBE NETWORK POLICY"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DescribeNetworkPolicyOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribeNetworkPolicyOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct NetworkPolicyRow {
    created_on: String,
    name: String,
    comment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    entries_in_allowed_ip_list: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    entries_in_blocked_ip_list: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    entries_in_allowed_network_rules: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    entries_in_blocked_network_rules: Option<i64>,
}

/// A network policy as reported by `SHOW NETWORK POLICIES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPolicy {
    pub created_on: String,
    pub name: String,
    pub comment: String,
    pub entries_in_allowed_ip_list: i64,
    pub entries_in_blocked_ip_list: i64,
    pub entries_in_allowed_network_rules: i64,
    pub entries_in_blocked_network_rules: i64,
}

impl NetworkPolicy {
    pub fn id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(&self.name)
    }
}

impl ConvertibleRow for NetworkPolicyRow {
    type Plain = NetworkPolicy;

    fn convert(&self) -> Result<NetworkPolicy> {
        Ok(NetworkPolicy {
            created_on: self.created_on.clone(),
            name: self.name.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            entries_in_allowed_ip_list: self.entries_in_allowed_ip_list.unwrap_or_default(),
            entries_in_blocked_ip_list: self.entries_in_blocked_ip_list.unwrap_or_default(),
            entries_in_allowed_network_rules: self
                .entries_in_allowed_network_rules
                .unwrap_or_default(),
            entries_in_blocked_network_rules: self
                .entries_in_blocked_network_rules
                .unwrap_or_default(),
        })
    }
}

/// One `name`/`value` row of `DESCRIBE NETWORK POLICY`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkPolicyProperty {
    pub name: String,
    pub value: String,
}

impl NetworkPolicyProperty {
    /// The comma-separated entries of a list property.
    pub fn entries(&self) -> Vec<&str> {
        self.value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Network policy operations, obtained from [`Client::network_policies`].
pub struct NetworkPolicies<'a> {
    client: &'a Client,
}

impl<'a> NetworkPolicies<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateNetworkPolicyOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterNetworkPolicyOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropNetworkPolicyOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowNetworkPolicyOptions>) -> Result<Vec<NetworkPolicy>> {
        let default = ShowNetworkPolicyOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, NetworkPolicyRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &AccountObjectIdentifier) -> Result<NetworkPolicy> {
        let opts = ShowNetworkPolicyOptions {
            like: Some(Like::new(id.name())),
        };
        let policies = self.show(Some(&opts)).await?;
        executor::show_by_id(policies, |p| p.name == id.name())
    }

    pub async fn describe(&self, id: &AccountObjectIdentifier) -> Result<Vec<NetworkPolicyProperty>> {
        let opts = DescribeNetworkPolicyOptions { name: id.clone() };
        executor::validate_and_query_plain(self.client, Some(&opts)).await
    }
}
