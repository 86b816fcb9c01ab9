pub mod gate;
pub mod login;

pub use gate::AuthorizationGate;
pub use login::LoginService;
