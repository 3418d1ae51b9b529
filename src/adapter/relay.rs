//! Mobile-bridge backend speaking JSON-RPC 2.0 over a relay transport.
//!
//! The concrete socket (bridge server, QR relay, deep link) is injected as
//! a `RelayTransport`; this module owns the protocol around it: request
//! envelopes with locally-distinguishing ids, a pending-request registry
//! delivering responses to one-shot channels, and the two timeout tiers
//! observed for relay-style wallets (short for teardown, long for
//! interactive enable/sign approval). Registered handlers are removed on
//! the success, error and timeout paths alike, so an abandoned approval
//! never leaks a channel.

use crate::adapter::{ClientSlot, ConnectArgs, WalletAdapter, WalletId};
use crate::error::WalletError;
use crate::session::store::SessionStore;
use crate::transaction::codec::{self, Address};
use crate::transaction::group::SigningInstruction;
use crate::transaction::reconcile::SignedResponse;
use crate::transaction::wire;

use futures_util::{Stream, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Interactive enable/sign calls wait for user approval on the remote
/// device.
pub const APPROVAL_TIMEOUT: Duration = Duration::from_secs(180);
/// Teardown calls are fire-and-mostly-forget.
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_millis(750);

/// JSON-RPC error code relays use for a user-rejected request.
const USER_REJECTED: i64 = 4001;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
	pub id: u64,
	pub jsonrpc: &'static str,
	pub method: String,
	pub params: T,
}

impl<T: Serialize> JsonRpcRequest<T> {
	pub fn new(method: impl Into<String>, params: T) -> Self {
		Self {
			id: next_request_id(),
			jsonrpc: "2.0",
			method: method.into(),
			params,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
	pub id: u64,
	#[serde(default)]
	pub result: Option<serde_json::Value>,
	#[serde(default)]
	pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
	pub code: i64,
	pub message: String,
}

/// Request ids only need to distinguish in-flight requests on one
/// connection: a coarse timestamp plus random jitter.
fn next_request_id() -> u64 {
	let coarse = chrono::Utc::now().timestamp().max(0) as u64 * 1000;
	coarse + rand::rng().random_range(0..1000)
}

/// The injected relay socket: outbound frames plus a stream of inbound
/// frames. `incoming` is consumed once, when the client starts routing.
#[async_trait::async_trait]
pub trait RelayTransport: Send + Sync {
	async fn send(&self, frame: String) -> Result<(), WalletError>;
	fn incoming(&self) -> Pin<Box<dyn Stream<Item = String> + Send>>;
}

/// Materializes a connected transport; invoked at most once per adapter
/// lifetime while the client slot is populated.
#[async_trait::async_trait]
pub trait RelayTransportFactory: Send + Sync {
	async fn connect(&self) -> Result<Arc<dyn RelayTransport>, WalletError>;
}

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<serde_json::Value, WalletError>>>>>;

/// Request/response client over a relay transport. A background task routes
/// inbound frames to the pending one-shot handler registered under the
/// request id.
pub struct RelayClient {
	transport: Arc<dyn RelayTransport>,
	pending: Pending,
	router: tokio::task::JoinHandle<()>,
}

impl RelayClient {
	pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
		let pending: Pending = Arc::default();
		let mut frames = transport.incoming();
		let router_pending = pending.clone();

		let router = tokio::spawn(async move {
			while let Some(frame) = frames.next().await {
				let response = match serde_json::from_str::<JsonRpcResponse>(&frame) {
					Ok(response) => response,
					Err(e) => {
						debug!("ignoring unparseable relay frame: {}", e);
						continue;
					}
				};
				let Some(handler) = router_pending.lock().unwrap().remove(&response.id) else {
					debug!("dropping relay frame for unknown request id {}", response.id);
					continue;
				};
				let outcome = match (response.result, response.error) {
					(_, Some(err)) if err.code == USER_REJECTED => Err(WalletError::UserCancelled),
					(_, Some(err)) => Err(WalletError::Backend(format!(
						"relay error {}: {}",
						err.code, err.message
					))),
					(Some(result), None) => Ok(result),
					(None, None) => Err(WalletError::Transport(
						"relay response carried neither result nor error".to_string(),
					)),
				};
				let _ = handler.send(outcome);
			}
		});

		Self {
			transport,
			pending,
			router,
		}
	}

	/// Send one request and await its response, racing a timer. The pending
	/// handler is deregistered on every exit path.
	pub async fn request(
		&self,
		method: &str,
		params: serde_json::Value,
		timeout: Duration,
	) -> Result<serde_json::Value, WalletError> {
		let request = JsonRpcRequest::new(method, params);
		let id = request.id;
		let frame = serde_json::to_string(&request)
			.map_err(|e| WalletError::Transport(format!("failed to encode relay request: {}", e)))?;

		let (handler, response) = oneshot::channel();
		self.pending.lock().unwrap().insert(id, handler);
		debug!("relay request {} ({})", id, method);

		if let Err(e) = self.transport.send(frame).await {
			self.pending.lock().unwrap().remove(&id);
			return Err(e);
		}

		match tokio::time::timeout(timeout, response).await {
			Ok(Ok(outcome)) => outcome,
			Ok(Err(_)) => {
				self.pending.lock().unwrap().remove(&id);
				Err(WalletError::Transport("relay connection closed".to_string()))
			}
			Err(_) => {
				self.pending.lock().unwrap().remove(&id);
				Err(WalletError::TimedOut(timeout))
			}
		}
	}
}

impl Drop for RelayClient {
	fn drop(&mut self) {
		self.router.abort();
	}
}

/// Bridge/relay wallet backend. Uses the positional (null-for-unsigned)
/// result convention.
pub struct BridgeWallet {
	store: Arc<SessionStore>,
	factory: Box<dyn RelayTransportFactory>,
	client: ClientSlot<RelayClient>,
}

impl BridgeWallet {
	pub fn new(store: Arc<SessionStore>, factory: Box<dyn RelayTransportFactory>) -> Self {
		Self {
			store,
			factory,
			client: ClientSlot::new(),
		}
	}

	async fn client(&self) -> Result<Arc<RelayClient>, WalletError> {
		self.client
			.get_or_materialize(|| async {
				info!("establishing relay transport");
				let transport = self.factory.connect().await?;
				Ok(RelayClient::new(transport))
			})
			.await
	}

	async fn enable(&self, network: String) -> Result<Vec<Address>, WalletError> {
		let client = self.client().await?;
		let result = client
			.request("enable", json!({ "network": network }), APPROVAL_TIMEOUT)
			.await?;
		let accounts = result
			.get("accounts")
			.and_then(|accounts| accounts.as_array())
			.ok_or_else(|| {
				WalletError::Backend("relay enable response missing accounts".to_string())
			})?;
		Ok(accounts
			.iter()
			.filter_map(|account| account.as_str())
			.map(|account| account.to_string())
			.collect())
	}
}

#[async_trait::async_trait]
impl WalletAdapter for BridgeWallet {
	fn id(&self) -> WalletId {
		WalletId::Bridge
	}

	fn display_name(&self) -> &'static str {
		"Bridge"
	}

	fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	async fn authorize(&self, args: Option<ConnectArgs>) -> Result<Vec<Address>, WalletError> {
		let network = args
			.and_then(|args| args.network)
			.unwrap_or_else(|| self.store.active_network());
		self.enable(network.to_string()).await
	}

	async fn fetch_live_accounts(&self) -> Result<Vec<Address>, WalletError> {
		// Relays replay an established authorization for the same session.
		let network = self.store.active_network();
		self.enable(network.to_string()).await
	}

	async fn teardown(&self) -> Result<(), WalletError> {
		let result = match self.client.current().await {
			Ok(client) => client
				.request("disable", json!({}), TEARDOWN_TIMEOUT)
				.await
				.map(|_| ()),
			Err(_) => Ok(()),
		};
		self.client.clear().await;
		result
	}

	async fn sign_instructions(
		&self,
		instructions: &[SigningInstruction],
	) -> Result<SignedResponse, WalletError> {
		let client = self.client.current().await?;
		let items = wire::to_wire(instructions);
		let result = client
			.request(
				"sign_transactions",
				json!({ "transactions": items }),
				APPROVAL_TIMEOUT,
			)
			.await?;

		let entries = result.as_array().ok_or_else(|| {
			WalletError::Backend("relay signing response is not an array".to_string())
		})?;
		let mut signed = Vec::with_capacity(entries.len());
		for (position, entry) in entries.iter().enumerate() {
			if entry.is_null() {
				signed.push(None);
			} else if let Some(encoded) = entry.as_str() {
				signed.push(Some(codec::from_base64(encoded)?));
			} else {
				return Err(WalletError::Backend(format!(
					"relay signing entry {} is neither base64 nor null",
					position
				)));
			}
		}
		Ok(SignedResponse::Positional(signed))
	}
}
