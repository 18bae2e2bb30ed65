use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Coefficient used for any API without an explicit base latency.
pub const DEFAULT_BASE_LATENCY_S: f64 = 1.0;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ApiDefinition {
    pub id: String,
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(default = "default_base_latency")]
    pub base_latency_s: f64,
}

impl ApiDefinition {
    /// First word of the display name, used where tables are narrow.
    pub fn short_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }
}

fn default_base_latency() -> f64 {
    DEFAULT_BASE_LATENCY_S
}

/// Ordered registry of API endpoints. Iteration order is definition order.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    apis: Vec<ApiDefinition>,
}

impl Catalog {
    pub fn new(apis: Vec<ApiDefinition>) -> Result<Self> {
        validate_apis(&apis)?;
        Ok(Self { apis })
    }

    pub fn builtin() -> Self {
        Self {
            apis: builtin_apis(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiDefinition> {
        self.apis.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ApiDefinition> {
        self.apis.iter().find(|api| api.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|api| api.name.as_str()).unwrap_or(id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_apis(apis: &[ApiDefinition]) -> Result<()> {
    if apis.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    let mut ids = HashSet::new();
    for api in apis {
        if api.id.trim().is_empty() {
            return Err(Error::UnknownApi(api.id.clone()));
        }
        if !api.base_latency_s.is_finite() || api.base_latency_s <= 0.0 {
            return Err(Error::InvalidBaseLatency(api.id.clone()));
        }
        if !ids.insert(api.id.as_str()) {
            return Err(Error::DuplicateApiId(api.id.clone()));
        }
    }
    Ok(())
}

fn api(id: &str, name: &str, path: &str, method: HttpMethod, base_latency_s: f64) -> ApiDefinition {
    ApiDefinition {
        id: id.to_string(),
        name: name.to_string(),
        path: path.to_string(),
        method,
        base_latency_s,
    }
}

fn builtin_apis() -> Vec<ApiDefinition> {
    vec![
        api(
            "auth",
            "Authentication (Auth API)",
            "/api/v2/oauth/token",
            HttpMethod::Post,
            0.8,
        ),
        api(
            "balance",
            "Balance inquiry (Deposit API)",
            "/api/v2/deposits/accounts/{accountId}",
            HttpMethod::Get,
            1.0,
        ),
        api(
            "p2p",
            "P2P transfers (P2P API)",
            "/api/v2/p2p",
            HttpMethod::Post,
            1.2,
        ),
        api(
            "qr",
            "QR payments (QR API)",
            "/api/v1/qr/push",
            HttpMethod::Post,
            1.0,
        ),
        api(
            "withdrawal",
            "Withdrawals (Withdrawal API)",
            "/api/v2/withdrawals",
            HttpMethod::Post,
            1.0,
        ),
    ]
}
