use std::fmt;

use frontier_common::EntityId;

use crate::{ApplicationRequest, FrontierRequestError, RequestBuilder};

/// Finalizes requests for one protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestEngine {
    version: u64,
}

impl RequestEngine {
    /// An engine accepting requests built for `version`.
    pub fn new(version: u64) -> Self {
        Self { version }
    }

    /// The protocol version this engine accepts.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Start a request stamped with this engine's version.
    pub fn request(&self, action: impl Into<String>) -> RequestBuilder {
        ApplicationRequest::builder(action).version(self.version)
    }

    /// Consume a fully discharged request.
    ///
    /// # Errors
    ///
    /// - [`FrontierRequestError::IncompleteRequest`] if any requirement is
    ///   still outstanding.
    /// - [`FrontierRequestError::InvalidVersion`] if the request was built
    ///   for a different protocol version.
    ///
    /// The request is dropped on failure. Use [`RequestEngine::prepare`] to
    /// get it back instead.
    pub fn complete(&self, request: ApplicationRequest) -> Result<Completed, FrontierRequestError> {
        self.prepare(request)
            .map(Prepared::complete)
            .map_err(Refused::into_error)
    }

    /// Check that `request` can be completed, without completing it.
    ///
    /// This is the first half of [`RequestEngine::complete`]: the caller
    /// can run its own checks on the [`Prepared`] request and either
    /// complete it or take it back.
    ///
    /// # Errors
    ///
    /// As [`RequestEngine::complete`], with the request handed back in the
    /// [`Refused`].
    pub fn prepare(&self, request: ApplicationRequest) -> Result<Prepared, Refused> {
        if request.pending() > 0 {
            tracing::debug!(action = %request.action(), remaining = request.pending(), "request has outstanding requirements");
            let error = FrontierRequestError::IncompleteRequest {
                action: request.action().to_owned(),
                remaining: request.pending(),
            };
            return Err(Refused::new(request, error));
        }

        if request.version() != self.version {
            let error = FrontierRequestError::InvalidVersion {
                expected: self.version,
                actual: request.version(),
            };
            return Err(Refused::new(request, error));
        }

        Ok(Prepared { request })
    }
}

/// A request that has passed every check of the engine that prepared it.
#[derive(Debug)]
pub struct Prepared {
    request: ApplicationRequest,
}

impl Prepared {
    /// The request awaiting completion.
    pub fn request(&self) -> &ApplicationRequest {
        &self.request
    }

    /// Give up on completing, keeping the request.
    pub fn into_request(self) -> ApplicationRequest {
        self.request
    }

    /// Consume the request.
    pub fn complete(self) -> Completed {
        let (action, version, owner, _) = self.request.into_parts();
        tracing::debug!(%action, version, "request completed");
        Completed {
            action,
            owner,
            version,
        }
    }
}

/// A request that could not be completed, handed back with the reason.
#[derive(Debug)]
pub struct Refused<E = FrontierRequestError> {
    /// The request, exactly as it was presented.
    pub request: ApplicationRequest,
    /// Why it was refused.
    pub error: E,
}

impl<E> Refused<E> {
    /// Pair `request` with the reason it was refused.
    pub fn new(request: ApplicationRequest, error: E) -> Self {
        Self { request, error }
    }

    /// Take the request back.
    pub fn into_request(self) -> ApplicationRequest {
        self.request
    }

    /// Drop the request, keeping the reason.
    pub fn into_error(self) -> E {
        self.error
    }

    /// Convert the error, keeping the request.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Refused<F> {
        Refused {
            request: self.request,
            error: f(self.error),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Refused<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request for '{}' refused: {}", self.request.action(), self.error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Refused<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Receipt for a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    action: String,
    owner: Option<EntityId>,
    version: u64,
}

impl Completed {
    /// The action that was allowed to run.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The entity the request was opened for, if any.
    pub fn owner(&self) -> Option<&EntityId> {
        self.owner.as_ref()
    }

    /// Protocol version the request was built against.
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Requirement, DEFAULT_PROTOCOL_VERSION};
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;
    use testresult::TestResult;

    struct Stamp;
    struct Seal(u16);

    assert_impl_all!(ApplicationRequest: Send, Sync);
    assert_impl_all!(Requirement: Send, Sync);

    #[test]
    fn it_completes_an_empty_request() -> TestResult {
        let engine = RequestEngine::new(DEFAULT_PROTOCOL_VERSION);
        let owner = EntityId::new([1; 32]);
        let request = ApplicationRequest::builder("anchor").owner(owner).build()?;

        let receipt = engine.complete(request)?;
        assert_eq!(receipt.action(), "anchor");
        assert_eq!(receipt.owner(), Some(&owner));
        assert_eq!(receipt.version(), 1);
        Ok(())
    }

    #[test_log::test]
    fn it_refuses_outstanding_requirements() -> TestResult {
        let engine = RequestEngine::new(1);
        let request = engine.request("anchor").requirement(Stamp).build()?;

        assert_eq!(
            engine.complete(request),
            Err(FrontierRequestError::IncompleteRequest {
                action: "anchor".into(),
                remaining: 1
            })
        );
        Ok(())
    }

    #[test]
    fn it_refuses_a_version_mismatch() -> TestResult {
        let engine = RequestEngine::new(2);
        let request = ApplicationRequest::builder("anchor").version(1).build()?;

        assert_eq!(
            engine.complete(request),
            Err(FrontierRequestError::InvalidVersion {
                expected: 2,
                actual: 1
            })
        );
        Ok(())
    }

    #[test]
    fn it_hands_back_a_request_it_cannot_prepare() -> TestResult {
        let engine = RequestEngine::new(1);
        let request = engine.request("anchor").requirement(Seal(7)).build()?;

        let refused = engine.prepare(request).expect_err("seal outstanding");
        assert!(matches!(
            refused.error,
            FrontierRequestError::IncompleteRequest { remaining: 1, .. }
        ));

        let mut request = refused.into_request();
        let Seal(value) = request.complete_requirement::<Seal>()?;
        assert_eq!(value, 7);
        assert_eq!(engine.complete(request)?.action(), "anchor");
        Ok(())
    }

    #[test]
    fn it_keeps_a_prepared_request_until_completed() -> TestResult {
        let engine = RequestEngine::new(3);
        let prepared = engine.prepare(engine.request("dock").build()?)?;
        assert_eq!(prepared.request().version(), 3);

        let request = prepared.into_request();
        let refused = RequestEngine::new(4).prepare(request).expect_err("version moved on");
        assert_eq!(
            refused.error,
            FrontierRequestError::InvalidVersion {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(engine.prepare(refused.request)?.complete().action(), "dock");
        Ok(())
    }

    proptest! {
        #[test]
        fn it_completes_once_every_requirement_is_discharged(stamps in 0usize..8, seals in prop::collection::vec(any::<u16>(), 0..8)) {
            let engine = RequestEngine::new(1);
            let mut builder = engine.request("transfer");
            for _ in 0..stamps {
                builder = builder.requirement(Stamp);
            }
            for seal in &seals {
                builder = builder.requirement(Seal(*seal));
            }
            let mut request = builder.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(request.pending(), stamps + seals.len());

            for seal in &seals {
                let Seal(value) = request
                    .complete_requirement::<Seal>()
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(value, *seal);
            }
            for _ in 0..stamps {
                request
                    .complete_requirement::<Stamp>()
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
            }

            prop_assert!(engine.complete(request).is_ok());
        }
    }
}
