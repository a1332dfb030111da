//! # SharePoint Online Integration Module
//!
//! This module provides the interface to SharePoint Online used by every
//! command in the CLI, implementing authentication, the REST and CSOM
//! protocol surfaces, error handling and deferred operation polling. It is
//! the only layer that talks HTTP to SharePoint; the command layer above
//! it never sees a raw request or response.
//!
//! ## Architecture
//!
//! The module follows a feature-based organization where each submodule
//! binds one domain of the SharePoint APIs:
//!
//! ```text
//! Command Layer (CLI)
//!          ↓
//! SharePoint Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, Microsoft identity platform)
//!     ├── Session Context (site URL, tokens, form digests)
//!     ├── Site Collections (modern REST + classic CSOM)
//!     ├── Site Designs & Site Scripts (SiteScriptUtility REST)
//!     ├── App Catalog (tenantappcatalog REST)
//!     └── Tenant Properties (storage entities, REST + CSOM)
//!          ↓
//! Protocol Layer (request, csom)
//!          ↓
//! SharePoint Online (/_api/..., /_vti_bin/client.svc/ProcessQuery)
//! ```
//!
//! ## Two protocol surfaces
//!
//! SharePoint Online exposes the functionality this CLI needs through two
//! rather different APIs, and both are spoken here:
//!
//! ### REST (`/_api/...`)
//!
//! The newer surface. JSON in, JSON out, addressed per resource. All
//! requests send `Accept: application/json;odata=nometadata` so responses
//! arrive without OData metadata noise. Modifying POSTs additionally
//! carry a form digest in the `X-RequestDigest` header, obtained from
//! `/_api/contextinfo` and cached per web by the session context.
//!
//! ### CSOM (`/_vti_bin/client.svc/ProcessQuery`)
//!
//! The legacy client object model, required for tenant administration
//! operations that have no REST equivalent (classic site collection
//! management, storage entity writes). A batch of actions and object
//! paths is serialized into an XML envelope and posted in one round trip;
//! the response is a JSON array whose first element is a header object
//! carrying `ErrorInfo` when the batch failed, with payload objects
//! following. [`csom`] owns envelope construction, response parsing and
//! the translation of `ErrorInfo` into command errors.
//!
//! ## Deferred operations
//!
//! Classic site collection creation, update and deletion do not finish
//! within the request. The server answers with an `SpoOperation` handle
//! (`IsComplete`, `PollingInterval`, an object identity) and continues in
//! the background. [`csom::wait_for_operation`] re-queries the handle at
//! the server-suggested interval until completion, bounded by an overall
//! timeout after which the wait is abandoned while the operation keeps
//! running server-side.
//!
//! ## Core Modules
//!
//! ### Session Context
//!
//! [`context`] - Carries the signed-in session through every operation:
//! - **Connected Site**: The site URL the user signed in to
//! - **Token Access**: Valid access tokens via the token manager, with
//!   transparent refresh
//! - **Admin URL Derivation**: `contoso.sharepoint.com` to
//!   `contoso-admin.sharepoint.com` for tenant administration calls
//! - **Digest Cache**: Form digests per web URL, retired before expiry
//!
//! Commands receive a [`SpoContext`] explicitly; there is no ambient
//! global session.
//!
//! ### Authentication Module
//!
//! [`auth`] - Implements OAuth 2.0 PKCE against the Microsoft identity
//! platform:
//! - **Complete Sign-in Flow**: Browser launch, local callback server,
//!   code redemption, token persistence
//! - **PKCE Security**: No client secret; SHA-256 challenge derived from
//!   a random verifier
//! - **Scope Binding**: Requests `{site}/.default offline_access` so the
//!   token is good for the connected tenant and refreshable
//!
//! ### Protocol Modules
//!
//! [`request`] - Thin REST helpers shared by all bindings. Bearer token,
//! accept header, optional digest, JSON/binary/raw bodies, plus bounded
//! retries for throttling (429 with `Retry-After`) and flaky gateways
//! (502). Non-success responses are mapped through the OData error
//! shapes into [`CommandError`](crate::error::CommandError).
//!
//! [`csom`] - Envelope builder, XML escaping (object identities contain
//! newlines that must survive as `&#xA;`), response array parsing and
//! the deferred operation poller.
//!
//! ### Binding Modules
//!
//! [`site`] - Site collections: modern creation via `SPSiteManager`,
//! site inspection via `/_api/site`, and the classic CSOM quartet
//! (create, update, list, remove) against the tenant admin site.
//!
//! [`sitedesign`] / [`sitescript`] - Site provisioning artifacts via the
//! `SiteScriptUtility` REST operations: register, list, inspect, apply
//! and delete.
//!
//! [`app`] - Tenant app catalog: catalog discovery through
//! `SP_TenantSettings_Current`, `.sppkg` upload, listing, deploy and
//! removal.
//!
//! [`tenant`] - Tenant properties (storage entities): reads via REST,
//! writes via the tenant admin CSOM API.
//!
//! ## Error Handling
//!
//! All fallible operations return
//! [`crate::error::Result`], so the three failure families stay
//! distinguishable for the command layer:
//! - **OData errors** - REST responses with an error body, surfaced with
//!   the server's own message
//! - **CSOM errors** - HTTP 200 responses whose header carries
//!   `ErrorInfo`, surfaced with message, type name and correlation id
//! - **Transport errors** - connectivity, TLS and protocol failures from
//!   the HTTP client

pub mod app;
pub mod auth;
pub mod context;
pub mod csom;
pub mod request;
pub mod site;
pub mod sitedesign;
pub mod sitescript;
pub mod tenant;

pub use context::SpoContext;
