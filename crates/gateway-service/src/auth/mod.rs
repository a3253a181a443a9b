//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `claims`: Claims principal built from verified bearer-token claims
//! - `decision`: Three-valued handler decision (allow / abstain / deny)
//! - `handler`: The authorization handler family
//! - `policy`: Composite policy evaluation (`AuthorizationService`)
//! - `requirement`: Declarative per-endpoint requirements
//! - `request`: Request context snapshot (route values, query, headers)
//! - `scope`: OAuth scope claim parsing and matching
//! - `store`: Narrow read interfaces onto external state
//! - `token`: HS256 bearer-token verification

pub mod claims;
pub mod decision;
pub mod handler;
pub mod policy;
pub mod requirement;
pub mod request;
pub mod scope;
pub mod store;
pub mod token;

// Re-export commonly used types at module level
pub use claims::ClaimsPrincipal;
pub use decision::Decision;
pub use handler::AuthorizationHandler;
pub use policy::{AuthorizationService, AuthzResult};
pub use requirement::{FhirRequirement, Requirement, SubjectLookup};
pub use request::{RequestContext, RequestContextBuilder};
pub use scope::{Audience, FhirAccessType, FhirResource, Scope, ScopeSet};
pub use store::{DbResourceDelegateStore, PatientLookup, ResourceDelegateStore};
pub use token::TokenVerifier;
