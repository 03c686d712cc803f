//! Username registration: pick a name, generate a wallet, confirm.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serenity::builder::CreateEmbed;
use serenity::model::id::UserId;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{Operation, RegisteredIdentity};
use crate::services::gateway::PaymentGateway;
use crate::utils::errors::RegistrationError;
use crate::utils::links::truncate_address;

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::default());
}

const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    ChooseUsername = 1,
    GenerateWallet = 2,
    Complete = 3,
}

impl RegistrationStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Progress bar value shown above the step
    pub fn progress(self) -> u8 {
        ((self.number() - 1) as f64 / 3.0 * 100.0).round() as u8
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    pub step: RegistrationStep,
    pub username: String,
    pub wallet_address: Option<String>,
    request: Operation<()>,
}

impl RegistrationFlow {
    fn new(username: String) -> Self {
        RegistrationFlow {
            step: RegistrationStep::ChooseUsername,
            username,
            wallet_address: None,
            request: Operation::Idle,
        }
    }

    pub fn handle(&self) -> String {
        format!("@{}.sei", self.username)
    }
}

/// Flows in progress plus every identity registered since startup
#[derive(Debug, Default)]
pub struct Registry {
    flows: HashMap<UserId, RegistrationFlow>,
    identities: HashMap<UserId, RegisteredIdentity>,
}

impl Registry {
    pub fn identity(&self, user_id: UserId) -> Option<&RegisteredIdentity> {
        self.identities.get(&user_id)
    }

    fn is_taken(&self, username: &str, by_other_than: UserId) -> bool {
        self.identities
            .iter()
            .any(|(owner, identity)| *owner != by_other_than && identity.username == username)
    }

    fn flow_mut(&mut self, user_id: UserId) -> Result<&mut RegistrationFlow, RegistrationError> {
        self.flows.get_mut(&user_id).ok_or(RegistrationError::NotStarted)
    }
}

/// Lowercase, trim and check the local username rules
pub fn normalize_username(input: &str) -> Result<String, RegistrationError> {
    let username = input
        .trim()
        .trim_start_matches('@')
        .trim_end_matches(".sei")
        .to_lowercase();
    if username.len() < MIN_USERNAME_LEN {
        return Err(RegistrationError::TooShort);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(RegistrationError::InvalidCharacters);
    }
    Ok(username)
}

/// Step 1: choose a username and check availability
pub async fn submit_username<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
    input: &str,
) -> Result<RegistrationFlow, RegistrationError> {
    submit_username_in(&REGISTRY, user_id, gateway, input).await
}

/// Step 2: generate the wallet bound to the chosen username
pub async fn generate_wallet<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
) -> Result<RegistrationFlow, RegistrationError> {
    generate_wallet_in(&REGISTRY, user_id, gateway).await
}

/// "Go Back" from wallet generation to username selection
pub async fn back(user_id: UserId) -> Result<RegistrationFlow, RegistrationError> {
    back_in(&REGISTRY, user_id).await
}

/// Step 3: finish and register the identity
pub async fn complete(user_id: UserId) -> Result<RegisteredIdentity, RegistrationError> {
    complete_in(&REGISTRY, user_id).await
}

pub async fn identity_of(user_id: UserId) -> Option<RegisteredIdentity> {
    REGISTRY.lock().await.identity(user_id).cloned()
}

/// Flow the user left off in, if any
pub async fn current_flow(user_id: UserId) -> Option<RegistrationFlow> {
    REGISTRY.lock().await.flows.get(&user_id).cloned()
}

async fn submit_username_in<G: PaymentGateway + ?Sized>(
    registry: &Mutex<Registry>,
    user_id: UserId,
    gateway: &G,
    input: &str,
) -> Result<RegistrationFlow, RegistrationError> {
    let username = normalize_username(input)?;

    {
        let mut reg = registry.lock().await;
        if let Some(identity) = reg.identity(user_id) {
            return Err(RegistrationError::AlreadyRegistered(identity.handle()));
        }
        let flow = reg
            .flows
            .entry(user_id)
            .or_insert_with(|| RegistrationFlow::new(username.clone()));
        if flow.step != RegistrationStep::ChooseUsername {
            return Err(RegistrationError::WrongStep { action: "username", step: flow.step.number() });
        }
        if !flow.request.begin() {
            return Err(RegistrationError::Busy);
        }
        flow.username = username.clone();
    }

    let checked = gateway.check_username(&username).await;

    let mut reg = registry.lock().await;
    let taken = reg.is_taken(&username, user_id);
    let flow = reg.flow_mut(user_id)?;
    let available = match checked {
        Ok(available) => available && !taken,
        Err(e) => {
            flow.request.finish(Err(e.clone()));
            return Err(e.into());
        }
    };

    if !available {
        flow.request.finish(Err(RegistrationError::Unavailable(username.clone())));
        debug!("Username {} unavailable for user {}", username, user_id);
        return Err(RegistrationError::Unavailable(username));
    }

    flow.request.finish::<String>(Ok(()));
    flow.step = RegistrationStep::GenerateWallet;
    Ok(flow.clone())
}

async fn generate_wallet_in<G: PaymentGateway + ?Sized>(
    registry: &Mutex<Registry>,
    user_id: UserId,
    gateway: &G,
) -> Result<RegistrationFlow, RegistrationError> {
    {
        let mut reg = registry.lock().await;
        let flow = reg.flow_mut(user_id)?;
        if flow.step != RegistrationStep::GenerateWallet {
            return Err(RegistrationError::WrongStep { action: "wallet", step: flow.step.number() });
        }
        if !flow.request.begin() {
            return Err(RegistrationError::Busy);
        }
    }

    let generated = gateway.generate_wallet().await;

    let mut reg = registry.lock().await;
    let flow = reg.flow_mut(user_id)?;
    match generated {
        Ok(address) => {
            flow.request.finish::<String>(Ok(()));
            flow.wallet_address = Some(address);
            flow.step = RegistrationStep::Complete;
            Ok(flow.clone())
        }
        Err(e) => {
            flow.request.finish(Err(e.clone()));
            Err(e.into())
        }
    }
}

async fn back_in(registry: &Mutex<Registry>, user_id: UserId) -> Result<RegistrationFlow, RegistrationError> {
    let mut reg = registry.lock().await;
    let flow = reg.flow_mut(user_id)?;
    if flow.request.is_pending() {
        return Err(RegistrationError::Busy);
    }
    if flow.step != RegistrationStep::GenerateWallet {
        return Err(RegistrationError::WrongStep { action: "back", step: flow.step.number() });
    }
    flow.step = RegistrationStep::ChooseUsername;
    Ok(flow.clone())
}

async fn complete_in(registry: &Mutex<Registry>, user_id: UserId) -> Result<RegisteredIdentity, RegistrationError> {
    let mut reg = registry.lock().await;
    let flow = reg.flow_mut(user_id)?;
    let wallet_address = match (flow.step, &flow.wallet_address) {
        (RegistrationStep::Complete, Some(address)) => address.clone(),
        (step, _) => {
            return Err(RegistrationError::WrongStep { action: "done", step: step.number() });
        }
    };
    let username = flow.username.clone();

    if reg.is_taken(&username, user_id) {
        return Err(RegistrationError::Unavailable(username));
    }

    let identity = RegisteredIdentity { username, wallet_address };
    reg.flows.remove(&user_id);
    reg.identities.insert(user_id, identity.clone());
    info!("User {} registered {}", user_id, identity.handle());
    Ok(identity)
}

pub fn create_flow_embed(flow: &RegistrationFlow) -> CreateEmbed {
    let embed = CreateEmbed::default()
        .title("Register Your Username")
        .footer(serenity::builder::CreateEmbedFooter::new(format!(
            "Step {}/3 • {}% complete",
            flow.step.number(),
            flow.step.progress()
        )))
        .color(0x00b0f4);

    match flow.step {
        RegistrationStep::ChooseUsername => embed
            .description("Choose a username for your wallet. This will be your public identity on TrustStream.")
            .field(
                "Rules",
                "• At least 3 characters\n• Only lowercase letters, numbers and underscores\n• Cannot be changed later",
                false,
            )
            .field("Next", "`$register <username>`", false),
        RegistrationStep::GenerateWallet => embed
            .description(format!("✅ {} is available!", flow.handle()))
            .field(
                "Generate a new wallet for your username",
                "• We'll generate a new SEI wallet address for you\n\
                 • Your username will be linked to this wallet address\n\
                 • You can use this wallet to send and receive payments",
                false,
            )
            .field("Next", "`$register wallet` or `$register back`", false),
        RegistrationStep::Complete => embed
            .description(format!(
                "Wallet generated for {}",
                flow.handle()
            ))
            .field(
                "Wallet Address",
                flow.wallet_address.as_deref().map(truncate_address).unwrap_or_default(),
                false,
            )
            .field("Next", "`$register done`", false),
    }
}

/// Step 1 card shown before any username has been entered
pub fn create_intro_embed() -> CreateEmbed {
    create_flow_embed(&RegistrationFlow::new(String::new()))
}

pub fn create_registered_embed(identity: &RegisteredIdentity) -> CreateEmbed {
    CreateEmbed::default()
        .title("🎉 Registration Complete")
        .description(format!("{} is now yours!", identity.handle()))
        .field("Your wallet address", format!("`{}`", identity.wallet_address), false)
        .field("Keep it safe", "You'll need it to access your account.", false)
        .color(0x00ff00)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SimulatedGateway;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new("truststream.app", false)
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Alice_01 "), Ok("alice_01".to_string()));
        assert_eq!(normalize_username("@bob.sei"), Ok("bob".to_string()));
        assert_eq!(normalize_username("ab"), Err(RegistrationError::TooShort));
        assert_eq!(normalize_username("al-ice"), Err(RegistrationError::InvalidCharacters));
    }

    #[tokio::test]
    async fn test_full_flow() {
        let registry = Mutex::new(Registry::default());
        let gw = gateway();
        let user = UserId::new(100);

        let flow = submit_username_in(&registry, user, &gw, "Carol").await.unwrap();
        assert_eq!(flow.step, RegistrationStep::GenerateWallet);
        assert_eq!(flow.handle(), "@carol.sei");

        let back = back_in(&registry, user).await.unwrap();
        assert_eq!(back.step, RegistrationStep::ChooseUsername);
        submit_username_in(&registry, user, &gw, "carol").await.unwrap();

        let flow = generate_wallet_in(&registry, user, &gw).await.unwrap();
        assert_eq!(flow.step, RegistrationStep::Complete);
        assert!(flow.wallet_address.as_deref().unwrap().starts_with("sei1"));

        let identity = complete_in(&registry, user).await.unwrap();
        assert_eq!(identity.handle(), "@carol.sei");
        assert!(registry.lock().await.identity(user).is_some());

        let again = submit_username_in(&registry, user, &gw, "carol2").await.unwrap_err();
        assert_eq!(again, RegistrationError::AlreadyRegistered("@carol.sei".to_string()));
    }

    #[tokio::test]
    async fn test_reserved_and_taken_names() {
        let registry = Mutex::new(Registry::default());
        let gw = gateway();
        let first = UserId::new(200);
        let second = UserId::new(201);

        assert_eq!(
            submit_username_in(&registry, first, &gw, "admin").await.unwrap_err(),
            RegistrationError::Unavailable("admin".to_string())
        );

        submit_username_in(&registry, first, &gw, "dave").await.unwrap();
        generate_wallet_in(&registry, first, &gw).await.unwrap();
        complete_in(&registry, first).await.unwrap();

        assert_eq!(
            submit_username_in(&registry, second, &gw, "dave").await.unwrap_err(),
            RegistrationError::Unavailable("dave".to_string())
        );
    }

    #[tokio::test]
    async fn test_steps_enforced() {
        let registry = Mutex::new(Registry::default());
        let gw = gateway();
        let user = UserId::new(300);

        assert_eq!(
            generate_wallet_in(&registry, user, &gw).await.unwrap_err(),
            RegistrationError::NotStarted
        );
        submit_username_in(&registry, user, &gw, "erin").await.unwrap();
        assert_eq!(
            complete_in(&registry, user).await.unwrap_err(),
            RegistrationError::WrongStep { action: "done", step: 2 }
        );
    }

    #[test]
    fn test_progress() {
        assert_eq!(RegistrationStep::ChooseUsername.progress(), 0);
        assert_eq!(RegistrationStep::GenerateWallet.progress(), 33);
        assert_eq!(RegistrationStep::Complete.progress(), 67);
    }
}
