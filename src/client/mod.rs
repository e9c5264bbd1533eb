//! Client side of the calculator: keypad state, the identity provider
//! seam and the HTTP caller.

pub mod api;
pub mod app;
pub mod identity;
pub mod keypad;

pub use api::{CalculatorClient, ClientError};
pub use app::Calculator;
pub use identity::{IdentityError, IdentityProvider, User};
pub use keypad::Keypad;
