pub mod body;
pub mod cache;
pub mod client;
pub mod mutation;
pub mod transport;

pub use body::{FilePart, MultipartBody, RequestBody};
pub use cache::{QueryCache, QueryKey};
pub use client::{ApiClient, GetRequest, QueryState, Visibility};
pub use mutation::{Mutation, MutationCallbacks, MutationInput};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
