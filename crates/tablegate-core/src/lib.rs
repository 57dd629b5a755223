//! Client-side session gate.
//!
//! Decides whether a visitor may see a protected view and supplies that
//! view's data:
//!
//! - [`SessionOracle`] asks the auth service whether the session is active
//! - [`RouteGuard`] turns the answer into admit, deny or wait
//! - [`DataViewController`] loads the dataset, serving from a TTL cache
//!
//! # Example
//!
//! ```no_run
//! use tablegate_cache::{CacheConfig, CacheStore};
//! use tablegate_client::GateClient;
//! use tablegate_core::{Admission, DataViewController, RouteGuard, SessionOracle};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GateClient::builder()
//!     .base_url("http://localhost:5000/api")
//!     .build()?;
//!
//! let oracle = SessionOracle::new(client.clone());
//! let guard = RouteGuard::new("/");
//! let view = DataViewController::new(client, CacheStore::in_memory(), &CacheConfig::default());
//!
//! if let Admission::Render(()) = guard.protect(&oracle, || ()).await {
//!     let restaurants = view.load_dataset(false).await?;
//!     println!("{} restaurants", restaurants.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod detail;
pub mod error;
pub mod guard;
pub mod service;
pub mod session;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock, local_time_label};
pub use detail::{DetailView, NOT_FOUND_MESSAGE, NOT_FOUND_TITLE};
pub use error::{
    CONNECTION_ERROR, DEFAULT_FETCH_ERROR, FetchError, FetchResult, GateError, LOGIN_FAILED,
    Result,
};
pub use guard::{Admission, GuardState, Mount, RouteGuard};
pub use service::{AuthResult, AuthService, Dataset, DatasetSource};
pub use session::{SessionCheck, SessionOracle, SessionState};
pub use view::{DataViewController, LoadPhase, ViewSnapshot};
