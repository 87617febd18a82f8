pub mod config;
pub mod elastic;
pub mod email;
pub mod error;
pub mod storage;

pub use error::Error;

/// A sink for prepared email messages.
///
/// Framework mail layers are expected to wrap an implementation of this
/// trait rather than extend a transport type. The transport receives a
/// fully-populated [`email::Email`] and returns the provider's raw
/// response body.
pub trait Mailer {
    fn submit(&self, email: &mut email::Email) -> Result<String, Error>;
}
