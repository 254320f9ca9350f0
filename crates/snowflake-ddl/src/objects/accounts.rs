//! Account-level settings.
//!
//! `ALTER ACCOUNT` changes the current account: parameters, resource
//! monitor, password policy and tags. Renaming names the account explicitly.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{set_tags, unset_tags, validate_filters, validate_tags, Like, TagAssociation};
use crate::client::Client;
use crate::core::identifier::{
    AccountIdentifier, AccountObjectIdentifier, Identifier, ObjectIdentifier,
    SchemaObjectIdentifier,
};
use crate::core::traits::Options;
use crate::core::value::sql_enum;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_lenient_int, deserialize_optional_flag, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

sql_enum! {
    pub enum AccountEdition ("account edition") {
        Standard = "STANDARD",
        Enterprise = "ENTERPRISE",
        BusinessCritical = "BUSINESS_CRITICAL",
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Account parameters accepted by `ALTER ACCOUNT SET`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountParameters {
    pub allow_id_token: Option<bool>,
    pub client_encryption_key_size: Option<i32>,
    pub enforce_network_rules_for_internal_stages: Option<bool>,
    pub initial_replication_size_limit_in_tb: Option<f64>,
    pub min_data_retention_time_in_days: Option<i32>,
    pub network_policy: Option<String>,
    pub periodic_data_rekeying: Option<bool>,
    pub prevent_unload_to_inline_url: Option<bool>,
    pub require_storage_integration_for_stage_creation: Option<bool>,
    pub sso_login_page: Option<bool>,
    pub simulated_data_sharing_consumer: Option<String>,
    pub timezone: Option<String>,
    pub default_ddl_collation: Option<String>,
}

impl Structure for AccountParameters {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("ALLOW_ID_TOKEN", self.allow_id_token.as_ref(), Modifiers::EQUALS),
            Field::param(
                "CLIENT_ENCRYPTION_KEY_SIZE",
                self.client_encryption_key_size.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "ENFORCE_NETWORK_RULES_FOR_INTERNAL_STAGES",
                self.enforce_network_rules_for_internal_stages.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "INITIAL_REPLICATION_SIZE_LIMIT_IN_TB",
                self.initial_replication_size_limit_in_tb.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "MIN_DATA_RETENTION_TIME_IN_DAYS",
                self.min_data_retention_time_in_days.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("NETWORK_POLICY", self.network_policy.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "PERIODIC_DATA_REKEYING",
                self.periodic_data_rekeying.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "PREVENT_UNLOAD_TO_INLINE_URL",
                self.prevent_unload_to_inline_url.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "REQUIRE_STORAGE_INTEGRATION_FOR_STAGE_CREATION",
                self.require_storage_integration_for_stage_creation.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("SSO_LOGIN_PAGE", self.sso_login_page.as_ref(), Modifiers::EQUALS),
            Field::param(
                "SIMULATED_DATA_SHARING_CONSUMER",
                self.simulated_data_sharing_consumer.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param("TIMEZONE", self.timezone.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "DEFAULT_DDL_COLLATION",
                self.default_ddl_collation.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
        ]
    }
}

impl AccountParameters {
    fn validate(&self, rules: &mut Rules) {
        rules
            .at_least_one_of(&[
                field("AllowIdToken", &self.allow_id_token),
                field("ClientEncryptionKeySize", &self.client_encryption_key_size),
                field(
                    "EnforceNetworkRulesForInternalStages",
                    &self.enforce_network_rules_for_internal_stages,
                ),
                field(
                    "InitialReplicationSizeLimitInTB",
                    &self.initial_replication_size_limit_in_tb,
                ),
                field("MinDataRetentionTimeInDays", &self.min_data_retention_time_in_days),
                field("NetworkPolicy", &self.network_policy),
                field("PeriodicDataRekeying", &self.periodic_data_rekeying),
                field("PreventUnloadToInlineURL", &self.prevent_unload_to_inline_url),
                field(
                    "RequireStorageIntegrationForStageCreation",
                    &self.require_storage_integration_for_stage_creation,
                ),
                field("SSOLoginPage", &self.sso_login_page),
                field("SimulatedDataSharingConsumer", &self.simulated_data_sharing_consumer),
                field("Timezone", &self.timezone),
                field("DefaultDDLCollation", &self.default_ddl_collation),
            ])
            .int_in_range(
                "MinDataRetentionTimeInDays",
                self.min_data_retention_time_in_days.map(i64::from),
                0,
                90,
            );
    }
}

/// Account parameters reset by `ALTER ACCOUNT UNSET`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountParametersUnset {
    pub allow_id_token: Option<bool>,
    pub client_encryption_key_size: Option<bool>,
    pub enforce_network_rules_for_internal_stages: Option<bool>,
    pub initial_replication_size_limit_in_tb: Option<bool>,
    pub min_data_retention_time_in_days: Option<bool>,
    pub network_policy: Option<bool>,
    pub periodic_data_rekeying: Option<bool>,
    pub prevent_unload_to_inline_url: Option<bool>,
    pub require_storage_integration_for_stage_creation: Option<bool>,
    pub sso_login_page: Option<bool>,
    pub simulated_data_sharing_consumer: Option<bool>,
    pub timezone: Option<bool>,
    pub default_ddl_collation: Option<bool>,
}

impl Structure for AccountParametersUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("ALLOW_ID_TOKEN", self.allow_id_token),
            Field::flag("CLIENT_ENCRYPTION_KEY_SIZE", self.client_encryption_key_size),
            Field::flag(
                "ENFORCE_NETWORK_RULES_FOR_INTERNAL_STAGES",
                self.enforce_network_rules_for_internal_stages,
            ),
            Field::flag(
                "INITIAL_REPLICATION_SIZE_LIMIT_IN_TB",
                self.initial_replication_size_limit_in_tb,
            ),
            Field::flag(
                "MIN_DATA_RETENTION_TIME_IN_DAYS",
                self.min_data_retention_time_in_days,
            ),
            Field::flag("NETWORK_POLICY", self.network_policy),
            Field::flag("PERIODIC_DATA_REKEYING", self.periodic_data_rekeying),
            Field::flag("PREVENT_UNLOAD_TO_INLINE_URL", self.prevent_unload_to_inline_url),
            Field::flag(
                "REQUIRE_STORAGE_INTEGRATION_FOR_STAGE_CREATION",
                self.require_storage_integration_for_stage_creation,
            ),
            Field::flag("SSO_LOGIN_PAGE", self.sso_login_page),
            Field::flag(
                "SIMULATED_DATA_SHARING_CONSUMER",
                self.simulated_data_sharing_consumer,
            ),
            Field::flag("TIMEZONE", self.timezone),
            Field::flag("DEFAULT_DDL_COLLATION", self.default_ddl_collation),
        ]
    }
}

impl AccountParametersUnset {
    fn validate(&self, rules: &mut Rules) {
        rules.at_least_one_of(&[
            field("AllowIdToken", &self.allow_id_token),
            field("ClientEncryptionKeySize", &self.client_encryption_key_size),
            field(
                "EnforceNetworkRulesForInternalStages",
                &self.enforce_network_rules_for_internal_stages,
            ),
            field(
                "InitialReplicationSizeLimitInTB",
                &self.initial_replication_size_limit_in_tb,
            ),
            field("MinDataRetentionTimeInDays", &self.min_data_retention_time_in_days),
            field("NetworkPolicy", &self.network_policy),
            field("PeriodicDataRekeying", &self.periodic_data_rekeying),
            field("PreventUnloadToInlineURL", &self.prevent_unload_to_inline_url),
            field(
                "RequireStorageIntegrationForStageCreation",
                &self.require_storage_integration_for_stage_creation,
            ),
            field("SSOLoginPage", &self.sso_login_page),
            field("SimulatedDataSharingConsumer", &self.simulated_data_sharing_consumer),
            field("Timezone", &self.timezone),
            field("DefaultDDLCollation", &self.default_ddl_collation),
        ]);
    }
}

// =============================================================================
// ALTER
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountSet {
    pub parameters: Option<AccountParameters>,
    pub resource_monitor: Option<AccountObjectIdentifier>,
    pub password_policy: Option<SchemaObjectIdentifier>,
}

impl Structure for AccountSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::record("", self.parameters.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::ident("RESOURCE_MONITOR", self.resource_monitor.as_ref(), Modifiers::EQUALS),
            Field::ident("PASSWORD POLICY", self.password_policy.as_ref(), Modifiers::NO_EQUALS),
        ]
    }
}

impl AccountSet {
    fn validate(&self, rules: &mut Rules) {
        rules
            .exactly_one_of(&[
                field("Parameters", &self.parameters),
                field("ResourceMonitor", &self.resource_monitor),
                field("PasswordPolicy", &self.password_policy),
            ])
            .valid_identifier_if_set(self.resource_monitor.as_ref())
            .valid_identifier_if_set(self.password_policy.as_ref());
        if let Some(parameters) = &self.parameters {
            rules.nested("Parameters", |r| parameters.validate(r));
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUnset {
    pub parameters: Option<AccountParametersUnset>,
    pub password_policy: Option<bool>,
}

impl Structure for AccountUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::record("", self.parameters.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::flag("PASSWORD POLICY", self.password_policy),
        ]
    }
}

impl AccountUnset {
    fn validate(&self, rules: &mut Rules) {
        rules.exactly_one_of(&[
            field("Parameters", &self.parameters),
            field("PasswordPolicy", &self.password_policy),
        ]);
        if let Some(parameters) = &self.parameters {
            rules.nested("Parameters", |r| parameters.validate(r));
        }
    }
}

/// `<name> RENAME TO <new_name> [SAVE_OLD_URL = ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRename {
    pub name: AccountObjectIdentifier,
    pub new_name: AccountObjectIdentifier,
    pub save_old_url: Option<bool>,
}

impl Structure for AccountRename {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::ident("RENAME TO", Some(&self.new_name), Modifiers::NO_EQUALS),
            Field::param("SAVE_OLD_URL", self.save_old_url.as_ref(), Modifiers::EQUALS),
        ]
    }
}

/// `ALTER ACCOUNT <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterAccountOptions {
    pub set: Option<AccountSet>,
    pub unset: Option<AccountUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
    pub rename: Option<AccountRename>,
}

impl Structure for AlterAccountOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER ACCOUNT"),
            Field::record("SET", self.set.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            set_tags(self.set_tag.as_deref()),
            unset_tags(self.unset_tag.as_deref()),
            Field::record("", self.rename.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for AlterAccountOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterAccountOptions");
        rules.exactly_one_of(&[
            field("Set", &self.set),
            field("Unset", &self.unset),
            list("SetTag", &self.set_tag),
            list("UnsetTag", &self.unset_tag),
            field("Rename", &self.rename),
        ]);
        if let Some(set) = &self.set {
            rules.nested("Set", |r| set.validate(r));
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| unset.validate(r));
        }
        if let Some(rename) = &self.rename {
            rules
                .valid_identifier(&rename.name)
                .valid_identifier(&rename.new_name);
        }
        validate_tags(&mut rules, self.set_tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// SHOW
// =============================================================================

/// `SHOW ACCOUNTS [LIKE '<pattern>']`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowAccountOptions {
    pub like: Option<Like>,
}

impl Structure for ShowAccountOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW ACCOUNTS"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowAccountOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowAccountOptions");
        validate_filters(&mut rules, self.like.as_ref(), None);
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    organization_name: String,
    account_name: String,
    region_group: Option<String>,
    snowflake_region: String,
    edition: String,
    account_url: String,
    created_on: DateTime<Utc>,
    comment: Option<String>,
    account_locator: String,
    account_locator_url: String,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    managed_accounts: Option<i64>,
    old_account_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_org_admin: bool,
}

/// An account of the organization, as reported by `SHOW ACCOUNTS`.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub organization_name: String,
    pub account_name: String,
    pub region_group: Option<String>,
    pub snowflake_region: String,
    pub edition: AccountEdition,
    pub account_url: String,
    pub created_on: DateTime<Utc>,
    pub comment: String,
    pub account_locator: String,
    pub account_locator_url: String,
    pub managed_accounts: i64,
    pub old_account_url: Option<String>,
    pub is_org_admin: bool,
}

impl Account {
    pub fn id(&self) -> AccountIdentifier {
        AccountIdentifier::new(&self.organization_name, &self.account_name)
    }
}

impl ConvertibleRow for AccountRow {
    type Plain = Account;

    fn convert(&self) -> Result<Account> {
        Ok(Account {
            organization_name: self.organization_name.clone(),
            account_name: self.account_name.clone(),
            region_group: self.region_group.clone().filter(|s| !s.is_empty()),
            snowflake_region: self.snowflake_region.clone(),
            edition: self.edition.parse()?,
            account_url: self.account_url.clone(),
            created_on: self.created_on,
            comment: self.comment.clone().unwrap_or_default(),
            account_locator: self.account_locator.clone(),
            account_locator_url: self.account_locator_url.clone(),
            managed_accounts: self.managed_accounts.unwrap_or_default(),
            old_account_url: self.old_account_url.clone().filter(|s| !s.is_empty()),
            is_org_admin: self.is_org_admin,
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Account operations, obtained from [`Client::accounts`].
pub struct Accounts<'a> {
    client: &'a Client,
}

impl<'a> Accounts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn alter(&self, opts: &AlterAccountOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowAccountOptions>) -> Result<Vec<Account>> {
        let default = ShowAccountOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, AccountRow>(self.client, Some(opts)).await
    }

    /// Look an account up by its organization-qualified name.
    pub async fn show_by_id(&self, id: &AccountIdentifier) -> Result<Account> {
        let opts = ShowAccountOptions {
            like: Some(Like::new(id.name())),
        };
        let accounts = self.show(Some(&opts)).await?;
        executor::show_by_id(accounts, |a| {
            a.account_name == id.name() && a.organization_name == id.organization_name()
        })
    }
}
