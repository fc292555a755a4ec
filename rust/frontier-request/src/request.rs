use std::any::{Any, type_name};

use frontier_common::EntityId;

use crate::{FrontierRequestError, Requirement};

/// Protocol version used when a request is built without an engine.
pub const DEFAULT_PROTOCOL_VERSION: u64 = 1;

/// An action waiting on a set of typed preconditions.
#[derive(Debug)]
pub struct ApplicationRequest {
    action: String,
    version: u64,
    owner: Option<EntityId>,
    requirements: Vec<Requirement>,
}

impl ApplicationRequest {
    /// Start building a request for `action`.
    pub fn builder(action: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            action: action.into(),
            version: DEFAULT_PROTOCOL_VERSION,
            owner: None,
            requirements: Vec::new(),
        }
    }

    /// Name of the action this request gates.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Protocol version the request was built against.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Entity on whose behalf the request was opened, if any.
    pub fn owner(&self) -> Option<&EntityId> {
        self.owner.as_ref()
    }

    /// Number of requirements still outstanding.
    pub fn pending(&self) -> usize {
        self.requirements.len()
    }

    /// Whether a requirement of type `T` is outstanding.
    pub fn has_requirement<T: Any>(&self) -> bool {
        self.requirements.iter().any(Requirement::is::<T>)
    }

    /// Borrow the first outstanding requirement of type `T`.
    ///
    /// Lets a discharging party validate against the payload before it
    /// commits to removing it.
    pub fn requirement<T: Any>(&self) -> Option<&T> {
        self.requirements.iter().find_map(Requirement::payload::<T>)
    }

    /// Remove the first outstanding requirement of type `T` and return its
    /// payload.
    ///
    /// # Errors
    ///
    /// [`FrontierRequestError::RequirementNotFound`] if no outstanding
    /// requirement has type `T`. The request is unchanged in that case.
    pub fn complete_requirement<T: Any>(&mut self) -> Result<T, FrontierRequestError> {
        let not_found = FrontierRequestError::RequirementNotFound {
            type_name: type_name::<T>(),
        };

        let index = self
            .requirements
            .iter()
            .position(Requirement::is::<T>)
            .ok_or_else(|| not_found.clone())?;

        let requirement = self.requirements.remove(index);
        match requirement.into_payload::<T>() {
            Ok(payload) => {
                tracing::trace!(action = %self.action, requirement = type_name::<T>(), remaining = self.requirements.len(), "requirement discharged");
                Ok(payload)
            }
            Err(requirement) => {
                self.requirements.insert(index, requirement);
                Err(not_found)
            }
        }
    }

    pub(crate) fn into_parts(self) -> (String, u64, Option<EntityId>, Vec<Requirement>) {
        (self.action, self.version, self.owner, self.requirements)
    }
}

/// Assembles an [`ApplicationRequest`].
#[derive(Debug)]
pub struct RequestBuilder {
    action: String,
    version: u64,
    owner: Option<EntityId>,
    requirements: Vec<Requirement>,
}

impl RequestBuilder {
    /// Set the protocol version the request is built against.
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Record the entity on whose behalf the request is opened.
    pub fn owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Add a requirement. Several requirements may share a type; they are
    /// discharged in insertion order.
    pub fn requirement<T>(mut self, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.requirements.push(Requirement::new(payload));
        self
    }

    /// Add an already wrapped requirement.
    pub fn with(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Finish the request.
    ///
    /// # Errors
    ///
    /// [`FrontierRequestError::EmptyAction`] if the action name is empty.
    pub fn build(self) -> Result<ApplicationRequest, FrontierRequestError> {
        if self.action.is_empty() {
            return Err(FrontierRequestError::EmptyAction);
        }

        tracing::debug!(action = %self.action, version = self.version, requirements = self.requirements.len(), "request opened");
        Ok(ApplicationRequest {
            action: self.action,
            version: self.version,
            owner: self.owner,
            requirements: self.requirements,
        })
    }
}
