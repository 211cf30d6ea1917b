//! Customer accounts: registration, login, profile and checkout resolution.

use serde::{Deserialize, Serialize};

use domain::{Address, CustomerAccount, CustomerId, CustomerInfo, PublicUser, Role, normalize_email};
use store::{AccountChanges, AccountStore, StoreError, seed::SeedUser};

use crate::auth::{PasswordHashing, TokenIssuer, placeholder_password};
use crate::error::AccountError;

const MIN_PASSWORD_LEN: usize = 6;

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `PUT /api/auth/me`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub addresses: Option<Vec<Address>>,
}

/// Body of `POST /api/auth/change-password`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// A signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// How checkout resolved the customer.
#[derive(Debug, Clone)]
pub struct ResolvedCustomer {
    pub account: CustomerAccount,
    pub created: bool,
    pub address_added: bool,
}

/// Account operations over an [`AccountStore`].
#[derive(Clone)]
pub struct AccountService<S: AccountStore> {
    store: S,
    hashing: PasswordHashing,
    tokens: TokenIssuer,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: S, hashing: PasswordHashing, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hashing,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    fn session(&self, account: &CustomerAccount) -> Result<Session, AccountError> {
        Ok(Session {
            token: self.tokens.issue(account.id, &account.email)?,
            user: account.public(),
        })
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<Session, AccountError> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AccountError::validation(
                "Please provide name, email, and password",
            ));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::validation(
                "Password must be at least 6 characters long",
            ));
        }
        if request.password != request.confirm_password {
            return Err(AccountError::validation("Passwords do not match"));
        }

        if self
            .store
            .find_account_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AccountError::EmailExists);
        }

        let hash = self.hashing.hash(&request.password)?;
        let account = CustomerAccount::new(request.name, &request.email, hash, Role::Customer);
        self.store
            .insert_account(&account)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(_) => AccountError::EmailExists,
                other => other.into(),
            })?;

        tracing::info!(customer_id = %account.id, "account registered");
        self.session(&account)
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<Session, AccountError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AccountError::validation(
                "Please provide email and password",
            ));
        }

        let account = self
            .store
            .find_account_by_email(&request.email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.hashing.verify(&request.password, &account.password_hash) {
            tracing::debug!(customer_id = %account.id, "password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        self.session(&account)
    }

    pub async fn profile(&self, id: CustomerId) -> Result<CustomerAccount, AccountError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        id: CustomerId,
        update: ProfileUpdate,
    ) -> Result<PublicUser, AccountError> {
        self.profile(id).await?;
        let mut changes = AccountChanges {
            name: update
                .name
                .filter(|n| !n.trim().is_empty())
                .map(|n| n.trim().to_string()),
            addresses: update.addresses,
            ..Default::default()
        };
        if let Some(email) = update.email.filter(|e| !e.trim().is_empty()) {
            let email = normalize_email(&email);
            if let Some(other) = self.store.find_account_by_email(&email).await?
                && other.id != id
            {
                return Err(AccountError::EmailTaken);
            }
            changes.email = Some(email);
        }

        // Only the named columns are written so a concurrent checkout's
        // appended address survives.
        let account = self
            .store
            .update_account(id, &changes)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(_) => AccountError::EmailTaken,
                StoreError::NotFound { .. } => AccountError::NotFound,
                other => other.into(),
            })?;

        Ok(account.public())
    }

    #[tracing::instrument(skip(self, change))]
    pub async fn change_password(
        &self,
        id: CustomerId,
        change: PasswordChange,
    ) -> Result<(), AccountError> {
        if change.current_password.is_empty() || change.new_password.is_empty() {
            return Err(AccountError::validation(
                "Please provide both current and new password",
            ));
        }
        if change.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::validation(
                "New password must be at least 6 characters long",
            ));
        }

        let account = self.profile(id).await?;
        if !self
            .hashing
            .verify(&change.current_password, &account.password_hash)
        {
            return Err(AccountError::WrongPassword);
        }

        let hash = self.hashing.hash(&change.new_password)?;
        self.store
            .set_password_hash(id, &hash)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AccountError::NotFound,
                other => other.into(),
            })?;
        tracing::info!(customer_id = %id, "password changed");
        Ok(())
    }

    /// Finds the checkout customer's account by email or creates one with a
    /// placeholder credential, and records the shipping address.
    ///
    /// If another request creates the same email first, the winner's
    /// account is used.
    #[tracing::instrument(skip(self, info), fields(email = %info.email))]
    pub async fn resolve_for_checkout(
        &self,
        info: &CustomerInfo,
    ) -> Result<ResolvedCustomer, AccountError> {
        let address = info.shipping_address();

        if let Some(account) = self.store.find_account_by_email(&info.email).await? {
            return self.remember(account, address).await;
        }

        let hash = self.hashing.hash(&placeholder_password())?;
        let account = CustomerAccount::new(info.name.clone(), &info.email, hash, Role::Customer)
            .with_address(address.clone());

        match self.store.insert_account(&account).await {
            Ok(()) => {
                tracing::info!(customer_id = %account.id, "account created at checkout");
                Ok(ResolvedCustomer {
                    account,
                    created: true,
                    address_added: true,
                })
            }
            Err(StoreError::DuplicateEmail(_)) => {
                tracing::debug!("lost account creation race, re-reading");
                let winner = self
                    .store
                    .find_account_by_email(&info.email)
                    .await?
                    .ok_or(AccountError::NotFound)?;
                self.remember(winner, address).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remember(
        &self,
        mut account: CustomerAccount,
        address: Address,
    ) -> Result<ResolvedCustomer, AccountError> {
        let address_added = self.store.append_address(account.id, &address).await?;
        if address_added {
            account.remember_address(address);
        }
        Ok(ResolvedCustomer {
            account,
            created: false,
            address_added,
        })
    }

    /// Creates the demo users that are not already present.
    pub async fn seed_users(&self, users: &[SeedUser]) -> Result<usize, AccountError> {
        let mut created = 0;
        for user in users {
            if self.store.find_account_by_email(user.email).await?.is_some() {
                continue;
            }
            let hash = self.hashing.hash(user.password)?;
            let mut account = CustomerAccount::new(user.name, user.email, hash, user.role);
            if let Some(address) = &user.address {
                account = account.with_address(address.clone());
            }
            self.store.insert_account(&account).await?;
            created += 1;
        }
        if created > 0 {
            tracing::info!(users = created, "Seeded demo users");
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn service() -> AccountService<InMemoryStore> {
        AccountService::new(
            InMemoryStore::new(),
            PasswordHashing::with_params(8, 1, 1).unwrap(),
            TokenIssuer::new("test-secret"),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "John Doe".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        }
    }

    fn info(street: &str) -> CustomerInfo {
        CustomerInfo {
            name: "Jane Smith".to_string(),
            email: "Jane@Example.com".to_string(),
            phone: "555".to_string(),
            street: street.to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            zip_code: "98101".to_string(),
            country: String::new(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let service = service();
        let session = service
            .register(register_request("John@Example.com"))
            .await
            .unwrap();
        assert_eq!(session.user.email, "john@example.com");
        assert_eq!(session.user.role, Role::Customer);

        let login = service
            .login(LoginRequest {
                email: "john@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);
        let claims = service.tokens().verify(&login.token).unwrap();
        assert_eq!(claims.customer_id().unwrap(), session.user.id);
    }

    #[tokio::test]
    async fn register_validation_messages() {
        let service = service();

        let short = RegisterRequest {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..register_request("a@b.c")
        };
        assert_eq!(
            service.register(short).await.unwrap_err().to_string(),
            "Password must be at least 6 characters long"
        );

        let mismatch = RegisterRequest {
            confirm_password: "password124".to_string(),
            ..register_request("a@b.c")
        };
        assert_eq!(
            service.register(mismatch).await.unwrap_err().to_string(),
            "Passwords do not match"
        );

        let missing = RegisterRequest {
            name: String::new(),
            ..register_request("a@b.c")
        };
        assert_eq!(
            service.register(missing).await.unwrap_err().to_string(),
            "Please provide name, email, and password"
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let service = service();
        service.register(register_request("a@b.c")).await.unwrap();
        let err = service
            .register(register_request("A@B.C"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailExists));
    }

    #[tokio::test]
    async fn bad_login_is_generic() {
        let service = service();
        service.register(register_request("a@b.c")).await.unwrap();

        for (email, password) in [("a@b.c", "wrong-pass"), ("nobody@b.c", "password123")] {
            let err = service
                .login(LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn update_profile_guards_email() {
        let service = service();
        service.register(register_request("taken@b.c")).await.unwrap();
        let me = service.register(register_request("me@b.c")).await.unwrap();

        let err = service
            .update_profile(
                me.user.id,
                ProfileUpdate {
                    email: Some("TAKEN@b.c".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));

        let updated = service
            .update_profile(
                me.user.id,
                ProfileUpdate {
                    name: Some("  Johnny ".to_string()),
                    email: Some("Me@B.c".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Johnny");
        assert_eq!(updated.email, "me@b.c");
    }

    #[tokio::test]
    async fn change_password_requires_current() {
        let service = service();
        let me = service.register(register_request("me@b.c")).await.unwrap();

        let err = service
            .change_password(
                me.user.id,
                PasswordChange {
                    current_password: "nope-nope".to_string(),
                    new_password: "newpass1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::WrongPassword));

        service
            .change_password(
                me.user.id,
                PasswordChange {
                    current_password: "password123".to_string(),
                    new_password: "newpass1".to_string(),
                },
            )
            .await
            .unwrap();

        service
            .login(LoginRequest {
                email: "me@b.c".to_string(),
                password: "newpass1".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn checkout_creates_then_reuses_account() {
        let service = service();

        let first = service
            .resolve_for_checkout(&info("789 Espresso Lane"))
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.account.email, "jane@example.com");
        assert_eq!(first.account.addresses.len(), 1);
        assert_eq!(first.account.addresses[0].country, "USA");

        let again = service
            .resolve_for_checkout(&info("789 espresso lane"))
            .await
            .unwrap();
        assert!(!again.created);
        assert!(!again.address_added);
        assert_eq!(again.account.id, first.account.id);

        let moved = service
            .resolve_for_checkout(&info("1 Pike Place"))
            .await
            .unwrap();
        assert!(moved.address_added);
        assert_eq!(moved.account.addresses.len(), 2);
        assert_eq!(moved.account.addresses[0].street, "789 Espresso Lane");
    }

    #[tokio::test]
    async fn seeding_users_is_idempotent() {
        let service = service();
        let users = store::seed::demo_users();
        assert_eq!(service.seed_users(&users).await.unwrap(), 3);
        assert_eq!(service.seed_users(&users).await.unwrap(), 0);

        let admin = service
            .login(LoginRequest {
                email: "admin@caffeinecorner.com".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(admin.user.role, Role::Admin);
    }
}
