use crate::domain::customer::CustomerSnapshot;
use crate::domain::ports::CustomerGateway;
use crate::error::{CreditError, Result};
use crate::infrastructure::resilience::{CircuitBreaker, ResiliencePolicy};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of one raw call against the customer service.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Authoritative absence (HTTP 404). Never retried.
    #[error("customer does not exist")]
    NotFound,
    /// Anything else: transport failure, non-2xx, undecodable body.
    #[error("transient failure: {0}")]
    Transient(String),
}

/// The remote-call primitive the resilience wrapper composes around.
#[async_trait]
pub trait CustomerEndpoint: Send + Sync {
    async fn fetch(&self, customer_id: &str) -> std::result::Result<CustomerSnapshot, EndpointError>;
}

/// HTTP endpoint for the customer service.
///
/// `GET {base_url}/api/customers/{id}`, expecting a JSON body deserializable
/// to [`CustomerSnapshot`]. 404 maps to [`EndpointError::NotFound`]; every
/// other failure is transient and left to the wrapper's retry policy.
pub struct HttpCustomerEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomerEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CustomerEndpoint for HttpCustomerEndpoint {
    async fn fetch(&self, customer_id: &str) -> std::result::Result<CustomerSnapshot, EndpointError> {
        let response = self
            .client
            .get(format!("{}/api/customers/{}", self.base_url, customer_id))
            .send()
            .await
            .map_err(|e| EndpointError::Transient(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EndpointError::NotFound);
        }
        if !response.status().is_success() {
            return Err(EndpointError::Transient(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EndpointError::Transient(e.to_string()))
    }
}

/// Timeout, retry and circuit-breaker decorator over a [`CustomerEndpoint`].
///
/// Each attempt is bounded by the policy's call timeout; transient failures
/// are retried up to `max_attempts`. A definitive not-found is returned
/// immediately and counts as a healthy response. One exhausted request
/// records one breaker failure; while the breaker is open, requests fail
/// fast as [`CreditError::ServiceUnavailable`] without a network attempt.
pub struct ResilientCustomerGateway<E> {
    endpoint: E,
    policy: ResiliencePolicy,
    breaker: CircuitBreaker,
}

impl<E: CustomerEndpoint> ResilientCustomerGateway<E> {
    pub fn new(endpoint: E, policy: ResiliencePolicy) -> Self {
        let breaker = CircuitBreaker::new(policy.failure_threshold, policy.cooldown);
        Self {
            endpoint,
            policy,
            breaker,
        }
    }
}

#[async_trait]
impl<E: CustomerEndpoint> CustomerGateway for ResilientCustomerGateway<E> {
    async fn resolve(&self, customer_id: &str) -> Result<CustomerSnapshot> {
        if !self.breaker.try_acquire() {
            warn!(customer = customer_id, "circuit open, skipping customer lookup");
            return Err(CreditError::ServiceUnavailable);
        }

        for attempt in 1..=self.policy.max_attempts {
            match tokio::time::timeout(self.policy.call_timeout, self.endpoint.fetch(customer_id))
                .await
            {
                Ok(Ok(customer)) => {
                    self.breaker.record_success();
                    debug!(customer = %customer.id, "customer resolved");
                    return Ok(customer);
                }
                Ok(Err(EndpointError::NotFound)) => {
                    // the dependency answered; absence is authoritative
                    self.breaker.record_success();
                    return Err(CreditError::not_found("customer", customer_id));
                }
                Ok(Err(EndpointError::Transient(reason))) => {
                    warn!(customer = customer_id, attempt, %reason, "customer lookup failed");
                }
                Err(_) => {
                    warn!(customer = customer_id, attempt, "customer lookup timed out");
                }
            }
        }

        self.breaker.record_failure();
        Err(CreditError::ServiceUnavailable)
    }
}

/// A fixed in-process customer directory.
///
/// Backs the CLI's `--customers` option and tests; resolves from a local map
/// with no resilience concerns.
#[derive(Default, Clone)]
pub struct StaticCustomerDirectory {
    customers: HashMap<String, CustomerSnapshot>,
}

impl StaticCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, customer: CustomerSnapshot) {
        self.customers.insert(customer.id.clone(), customer);
    }
}

impl FromIterator<CustomerSnapshot> for StaticCustomerDirectory {
    fn from_iter<I: IntoIterator<Item = CustomerSnapshot>>(iter: I) -> Self {
        let mut directory = Self::new();
        for customer in iter {
            directory.insert(customer);
        }
        directory
    }
}

#[async_trait]
impl CustomerGateway for StaticCustomerDirectory {
    async fn resolve(&self, customer_id: &str) -> Result<CustomerSnapshot> {
        self.customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| CreditError::not_found("customer", customer_id))
    }
}
