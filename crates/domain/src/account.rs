//! Customer accounts and shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::CustomerId;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl Address {
    /// Two addresses are the same place when street and city agree,
    /// ignoring case and surrounding whitespace.
    pub fn same_place(&self, other: &Address) -> bool {
        fn eq(a: &str, b: &str) -> bool {
            a.trim().eq_ignore_ascii_case(b.trim())
        }
        eq(&self.street, &other.street) && eq(&self.city, &other.city)
    }
}

/// Lowercases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A registered (or checkout-created) customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAccount {
    pub id: CustomerId,
    pub name: String,
    /// Always normalized, see [`normalize_email`].
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
}

impl CustomerAccount {
    pub fn new(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: CustomerId::new(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            addresses: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// Appends the address unless one at the same place is already on file.
    /// Returns `true` when the list grew.
    pub fn remember_address(&mut self, address: Address) -> bool {
        if self.addresses.iter().any(|a| a.same_place(&address)) {
            return false;
        }
        self.addresses.push(address);
        true
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            addresses: self.addresses.clone(),
        }
    }
}

/// The externally visible part of an account (no credential).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub addresses: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(street: &str, city: &str) -> Address {
        Address {
            street: street.to_string(),
            city: city.to_string(),
            state: "OR".to_string(),
            zip_code: "97201".to_string(),
            country: "USA".to_string(),
        }
    }

    #[test]
    fn email_is_normalized() {
        let account = CustomerAccount::new("John", "  John@Example.COM ", "hash", Role::Customer);
        assert_eq!(account.email, "john@example.com");
        assert_eq!(normalize_email("A@B.c"), "a@b.c");
    }

    #[test]
    fn remember_address_skips_same_place() {
        let mut account = CustomerAccount::new("John", "john@example.com", "hash", Role::Customer)
            .with_address(address("456 Brew Avenue", "Portland"));

        assert!(!account.remember_address(address("456 brew avenue ", "PORTLAND")));
        assert_eq!(account.addresses.len(), 1);

        assert!(account.remember_address(address("1 Roast Rd", "Portland")));
        assert_eq!(account.addresses.len(), 2);
        assert_eq!(account.addresses[0].street, "456 Brew Avenue");
    }

    #[test]
    fn same_street_other_city_is_new() {
        let a = address("12 Main St", "Seattle");
        let b = address("12 Main St", "Tacoma");
        assert!(!a.same_place(&b));
    }

    #[test]
    fn public_view_omits_credential() {
        let account = CustomerAccount::new("Jane", "jane@example.com", "secret-hash", Role::Admin);
        let json = serde_json::to_string(&account.public()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
