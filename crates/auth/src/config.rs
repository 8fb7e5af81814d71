//! Security configuration resolved from named settings.

use serde::{Deserialize, Serialize};

use runas_core::{CoreError, CoreResult, SystemSettings, TenantId};

pub const ANONYMOUS_USER_SETTING: &str = "anonymous-authentication/anonymous-user";
pub const ANONYMOUS_ROLE_SETTING: &str = "anonymous-authentication/anonymous-role";
pub const ADMIN_USER_NAME_KEY_SETTING: &str = "security/admin-user-name-key";
pub const ADMIN_ROLE_SETTING: &str = "acl-voter/admin-role";
pub const DEFAULT_TENANT_SETTING: &str = "security/default-tenant";

pub const DEFAULT_ANONYMOUS_USER: &str = "anonymousUser";
pub const DEFAULT_ANONYMOUS_ROLE: &str = "Anonymous";
pub const DEFAULT_ADMIN_USER_NAME_KEY: &str = "singleTenantAdminUserName";
pub const DEFAULT_ADMIN_ROLE: &str = "Administrator";

/// Names the executor needs but must not hard-code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Principal name that maps to the anonymous identity.
    pub anonymous_user: String,
    /// Sole authority granted to the anonymous identity.
    pub anonymous_role: String,
    /// Key looked up in the name registry to find the system principal.
    pub admin_user_name_key: String,
    /// Authority that marks an identity as an administrator.
    pub admin_role: String,
    /// Tenant used when a lookup is not tenant-qualified.
    #[serde(default)]
    pub default_tenant: Option<TenantId>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            anonymous_user: DEFAULT_ANONYMOUS_USER.to_string(),
            anonymous_role: DEFAULT_ANONYMOUS_ROLE.to_string(),
            admin_user_name_key: DEFAULT_ADMIN_USER_NAME_KEY.to_string(),
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            default_tenant: None,
        }
    }
}

impl SecurityConfig {
    /// Read the configuration, applying defaults for undefined settings.
    pub fn from_settings(settings: &dyn SystemSettings) -> CoreResult<Self> {
        let default_tenant = match settings.system_setting(DEFAULT_TENANT_SETTING) {
            Some(raw) => Some(TenantId::new(raw).map_err(|e| {
                CoreError::invalid_setting(DEFAULT_TENANT_SETTING, e.to_string())
            })?),
            None => None,
        };

        Ok(Self {
            anonymous_user: required(settings, ANONYMOUS_USER_SETTING, DEFAULT_ANONYMOUS_USER)?,
            anonymous_role: required(settings, ANONYMOUS_ROLE_SETTING, DEFAULT_ANONYMOUS_ROLE)?,
            admin_user_name_key: required(
                settings,
                ADMIN_USER_NAME_KEY_SETTING,
                DEFAULT_ADMIN_USER_NAME_KEY,
            )?,
            admin_role: required(settings, ADMIN_ROLE_SETTING, DEFAULT_ADMIN_ROLE)?,
            default_tenant,
        })
    }
}

fn required(settings: &dyn SystemSettings, path: &str, default: &str) -> CoreResult<String> {
    let value = settings.system_setting_or(path, default);
    if value.trim().is_empty() {
        return Err(CoreError::invalid_setting(path, "must not be blank"));
    }
    Ok(value)
}
