use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

pub type HttpClient = Client<hyper_tls::HttpsConnector<HttpConnector>, String>;

/// Shared client for outbound calls; speaks both http and https.
pub fn create_client() -> HttpClient {
    let https = hyper_tls::HttpsConnector::new();
    Client::builder(TokioExecutor::new()).build(https)
}
