//! # REST API Client
//!
//! The backend is consumed over plain JSON/HTTP.
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartOperation          Method   Path                  Body            │
//! │  ─────────────────────  ──────   ────────────────────  ─────────────── │
//! │  AddItem                POST     /cart/add             productId,      │
//! │                                                        quantity,       │
//! │                                                        variantId?      │
//! │  UpdateQuantity         PUT      /cart/update          productId,      │
//! │                                                        quantity        │
//! │  RemoveItem             DELETE   /cart/item/{id}       -               │
//! │  ApplyCoupon            POST     /cart/coupon          couponCode      │
//! │  RemoveCoupon           DELETE   /cart/coupon          -               │
//! │  ClearCart              DELETE   /cart/clear           -               │
//! │                                                                         │
//! │  search                 GET      /products/search?q=&limit=            │
//! │  health                 GET      /health                               │
//! │                                                                         │
//! │  Authorization: Bearer <token from SessionStore>                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sync and search layers depend on the [`CartApi`] and [`SearchApi`]
//! traits, never on [`RestApi`] directly, so tests swap in mocks.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use rewardcart_core::{CartOperation, CashbackRate, Money, ProductHit};

use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::session::SessionStore;

// =============================================================================
// Traits
// =============================================================================

/// Server side of the cart.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Replays one cart mutation on the server.
    async fn apply(&self, op: &CartOperation) -> SyncResult<()>;

    /// Cheap reachability check.
    async fn health(&self) -> SyncResult<()>;
}

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> SyncResult<Vec<ProductHit>>;
}

// =============================================================================
// Routing
// =============================================================================

/// HTTP request derived from a cart operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Maps an operation onto its endpoint.
pub fn route_for(op: &CartOperation) -> Route {
    match op {
        CartOperation::AddItem {
            product_id,
            quantity,
            variant_id,
        } => {
            let mut body = json!({ "productId": product_id, "quantity": quantity });
            if let Some(variant) = variant_id {
                body["variantId"] = json!(variant);
            }
            Route {
                method: Method::POST,
                path: "/cart/add".to_string(),
                body: Some(body),
            }
        }
        CartOperation::UpdateQuantity {
            product_id,
            quantity,
        } => Route {
            method: Method::PUT,
            path: "/cart/update".to_string(),
            body: Some(json!({ "productId": product_id, "quantity": quantity })),
        },
        CartOperation::RemoveItem { product_id } => Route {
            method: Method::DELETE,
            path: format!("/cart/item/{product_id}"),
            body: None,
        },
        CartOperation::ApplyCoupon { code } => Route {
            method: Method::POST,
            path: "/cart/coupon".to_string(),
            body: Some(json!({ "couponCode": code })),
        },
        CartOperation::RemoveCoupon => Route {
            method: Method::DELETE,
            path: "/cart/coupon".to_string(),
            body: None,
        },
        CartOperation::ClearCart => Route {
            method: Method::DELETE,
            path: "/cart/clear".to_string(),
            body: None,
        },
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Search responses come either wrapped or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { products: Vec<WireProduct> },
    Bare(Vec<WireProduct>),
}

impl SearchResponse {
    fn into_products(self) -> Vec<WireProduct> {
        match self {
            SearchResponse::Wrapped { products } | SearchResponse::Bare(products) => products,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProduct {
    #[serde(alias = "_id")]
    id: WireId,
    name: String,
    #[serde(default)]
    brand: Option<String>,
    /// Major units, e.g. 499.5
    price: f64,
    /// Percent, e.g. 5 for 5%
    #[serde(default, alias = "cashback")]
    cashback_rate: Option<f64>,
    #[serde(default, alias = "image")]
    image_url: Option<String>,
}

impl From<WireProduct> for ProductHit {
    fn from(wire: WireProduct) -> Self {
        let id = match wire.id {
            WireId::Text(id) => id,
            WireId::Number(n) => n.to_string(),
        };
        // Rounded once here; everything downstream is integer.
        let price = Money::from_cents((wire.price * 100.0).round() as i64);
        let bps = wire
            .cashback_rate
            .map(|pct| (pct * 100.0).round().clamp(0.0, 10_000.0) as u32)
            .unwrap_or(0);

        ProductHit {
            id,
            name: wire.name,
            brand: wire.brand,
            price,
            cashback_rate: CashbackRate::from_bps(bps),
            image_url: wire.image_url,
        }
    }
}

/// Error bodies usually look like `{"message": "..."}`.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

// =============================================================================
// RestApi
// =============================================================================

/// reqwest-backed implementation of the API traits.
#[derive(Debug, Clone)]
pub struct RestApi {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl RestApi {
    pub fn new(config: &ClientConfig, session: SessionStore) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(RestApi {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> SyncResult<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and turns non-2xx answers into [`SyncError::Http`].
    async fn send(&self, builder: reqwest::RequestBuilder) -> SyncResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), message = %message, "API request failed");

        Err(SyncError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CartApi for RestApi {
    #[instrument(skip(self), fields(kind = op.kind().as_str()))]
    async fn apply(&self, op: &CartOperation) -> SyncResult<()> {
        let route = route_for(op);
        let mut builder = self.request(route.method, self.url(&route.path)?);
        if let Some(body) = route.body {
            builder = builder.json(&body);
        }

        self.send(builder).await?;
        debug!("Cart operation accepted");
        Ok(())
    }

    async fn health(&self) -> SyncResult<()> {
        let url = self.url("/health")?;
        self.send(self.client.get(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchApi for RestApi {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: u32) -> SyncResult<Vec<ProductHit>> {
        let mut url = self.url("/products/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());

        let response = self.send(self.request(Method::GET, url)).await?;
        let parsed: SearchResponse = response.json().await?;
        let products: Vec<ProductHit> = parsed
            .into_products()
            .into_iter()
            .map(ProductHit::from)
            .collect();

        debug!(count = products.len(), "Search results received");
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_route() {
        let route = route_for(&CartOperation::AddItem {
            product_id: "p-1".into(),
            quantity: 2,
            variant_id: Some("v-red".into()),
        });
        assert_eq!(route.method, Method::POST);
        assert_eq!(route.path, "/cart/add");
        assert_eq!(
            route.body,
            Some(json!({ "productId": "p-1", "quantity": 2, "variantId": "v-red" }))
        );

        let route = route_for(&CartOperation::AddItem {
            product_id: "p-1".into(),
            quantity: 1,
            variant_id: None,
        });
        assert!(route.body.unwrap().get("variantId").is_none());
    }

    #[test]
    fn test_other_routes() {
        let route = route_for(&CartOperation::RemoveItem {
            product_id: "sku_9".into(),
        });
        assert_eq!(route.method, Method::DELETE);
        assert_eq!(route.path, "/cart/item/sku_9");
        assert!(route.body.is_none());

        let route = route_for(&CartOperation::ApplyCoupon {
            code: "SAVE10".into(),
        });
        assert_eq!(route.body, Some(json!({ "couponCode": "SAVE10" })));

        assert_eq!(route_for(&CartOperation::RemoveCoupon).path, "/cart/coupon");
        assert_eq!(route_for(&CartOperation::ClearCart).path, "/cart/clear");
        assert_eq!(
            route_for(&CartOperation::UpdateQuantity {
                product_id: "p".into(),
                quantity: 3
            })
            .method,
            Method::PUT
        );
    }

    #[test]
    fn test_search_response_shapes() {
        let wrapped: SearchResponse = serde_json::from_str(
            r#"{"products":[{"id":"p1","name":"Basmati Rice","price":499.5,"cashbackRate":5,"image":"https://img/1.png"}]}"#,
        )
        .unwrap();
        let hits: Vec<ProductHit> = wrapped
            .into_products()
            .into_iter()
            .map(ProductHit::from)
            .collect();
        assert_eq!(hits[0].price.cents(), 49950);
        assert_eq!(hits[0].cashback_rate.bps(), 500);
        assert_eq!(hits[0].image_url.as_deref(), Some("https://img/1.png"));

        let bare: SearchResponse =
            serde_json::from_str(r#"[{"_id":42,"name":"Atta","price":10}]"#).unwrap();
        let hit = ProductHit::from(bare.into_products().remove(0));
        assert_eq!(hit.id, "42");
        assert_eq!(hit.cashback_rate.bps(), 0);
        assert!(hit.brand.is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Out of stock"}"#),
            "Out of stock"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            "Service Unavailable"
        );
    }

    #[test]
    fn test_rest_api_url_join() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.example.com/v1/".into();
        let api = RestApi::new(&config, SessionStore::default()).unwrap();
        assert_eq!(
            api.url("/cart/add").unwrap().as_str(),
            "https://api.example.com/v1/cart/add"
        );
    }
}
