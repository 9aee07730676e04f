//! # apiprobe core
//!
//! Log in against a JSON web API and probe the shape of its endpoints.
//!
//! A [`ProbeRunner`] performs one login call, keeps the returned token in a
//! [`Session`], then issues one `GET` per [`EndpointDescriptor`]. Each response
//! is classified ([`ResponseShape`]) and summarized into a [`ProbeResult`]:
//! status code, item count, sample keys and whether the expected shape and key
//! fields were found.
//!
//! Failures never abort a run: a refused connection, a `401` or a body that is
//! not JSON is recorded in the endpoint's result and probing continues with
//! the next endpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apiprobe_core::{Credentials, EndpointDescriptor, ProbeRunner};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = ProbeRunner::builder("http://localhost:8000/api").build()?;
//!
//! let session = match runner.authenticate(&Credentials::new("admin", "admin123")?).await {
//!     Ok(session) => session,
//!     Err(failure) => {
//!         eprintln!("{failure}");
//!         runner.anonymous_session()
//!     }
//! };
//!
//! let descriptors = [
//!     EndpointDescriptor::new("/dashboard/stats/").with_key_fields(["total_users"]),
//!     EndpointDescriptor::paginated("/users/"),
//! ];
//! for result in runner.probe(&session, &descriptors).await {
//!     println!(
//!         "{} -> {:?} matched={} items={:?}",
//!         result.endpoint(),
//!         result.status_code(),
//!         result.shape_matched(),
//!         result.item_count()
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration and reports
//!
//! A whole run can be described by a [`ProbeConfig`] (usually read from YAML)
//! and executed with [`ProbeRunner::run`]; the resulting [`ProbeReport`] is
//! rendered as text or JSON with [`report::render`].

mod auth;
pub use self::auth::{Credentials, LoginProfile, SecureString, Session, TokenScheme, UserId};

pub mod config;
pub use self::config::{ConfigError, ProbeConfig};

mod descriptor;
pub use self::descriptor::{EndpointDescriptor, ExpectedShape};

mod error;
pub use self::error::{AuthFailure, ProbeError};

pub mod report;
pub use self::report::{LoginOutcome, ProbeReport, ReportFormat};

mod result;
pub use self::result::{ProbeFailure, ProbeResult};

mod runner;
pub use self::runner::{ProbeRunner, ProbeRunnerBuilder};

pub mod shape;
pub use self::shape::{PageInfo, ResponseShape, ShapeSummary, classify};

mod status;
pub use self::status::SuccessCodes;
