//! In-memory fakes shared by the unit tests.

use std::sync::Arc;

use reportlink_core::BoxError;

use crate::api::{Connection, Credentials, Driver};

pub(crate) struct FakeDriver {
    identifier: String,
    url_prefix: String,
    failure: Option<String>,
}

impl FakeDriver {
    /// A driver that accepts URLs starting with `url_prefix` and connects
    /// successfully.
    pub(crate) fn accepting(identifier: &str, url_prefix: &str) -> Arc<dyn Driver> {
        Arc::new(Self {
            identifier: identifier.into(),
            url_prefix: url_prefix.into(),
            failure: None,
        })
    }

    /// A driver that resolves but fails negotiation with `message`.
    pub(crate) fn failing(identifier: &str, url_prefix: &str, message: &str) -> Arc<dyn Driver> {
        Arc::new(Self {
            identifier: identifier.into(),
            url_prefix: url_prefix.into(),
            failure: Some(message.into()),
        })
    }
}

impl Driver for FakeDriver {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn accepts_url(&self, url: &str) -> bool {
        url.starts_with(&self.url_prefix)
    }

    fn connect(
        &self,
        url: &str,
        _credentials: &Credentials,
    ) -> Result<Box<dyn Connection>, BoxError> {
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(Box::new(FakeConnection { url: url.into() })),
        }
    }
}

pub(crate) struct FakeConnection {
    url: String,
}

impl Connection for FakeConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn close(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }
}
