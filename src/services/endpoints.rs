//! One method per API action, each a thin call through [`StreamClient::request`].

use crate::models::error::ApiError;
use crate::models::query::QueryParams;
use crate::services::client::{StreamClient, expand_path};
use serde_json::{Value, json};

type ApiResult = Result<Value, ApiError>;

const ME: &str = "/me";
const CONSUMERS: &str = "/consumers";
const CONSUMER: &str = "/consumers/{id}";
const PRODUCTS: &str = "/products";
const PRODUCT: &str = "/products/{id}";
const SUBSCRIPTIONS: &str = "/subscriptions";
const SUBSCRIPTION: &str = "/subscriptions/{id}";
const SUBSCRIPTION_ACTION: &str = "/subscriptions/{id}/{action}";
const SUBSCRIPTION_FREEZES: &str = "/subscriptions/{id}/freeze";
const SUBSCRIPTION_FREEZE: &str = "/subscriptions/{id}/freeze/{freeze_id}";
const INVOICES: &str = "/invoices";
const INVOICE: &str = "/invoices/{id}";
const INVOICE_IN_PLACE: &str = "/invoices/{id}/inplace";
const INVOICE_ACTION: &str = "/invoices/{id}/{action}";
const PAYMENTS: &str = "/payments";
const PAYMENT: &str = "/payments/{id}";
const PAYMENT_ACTION: &str = "/payments/{id}/{action}";
const PAYMENT_AUTO_CHARGE: &str = "/payments/auto-charge-on-demand/{id}";
const COUPONS: &str = "/coupons";
const COUPON: &str = "/coupons/{id}";
const PAYMENT_LINKS: &str = "/payment_links";
const PAYMENT_LINK: &str = "/payment_links/{id}";
const PAYMENT_LINK_STATUS: &str = "/payment_links/{id}/status";

/// State transitions an invoice can be moved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    Send,
    Accept,
    Reject,
    Complete,
    Cancel,
}

impl InvoiceAction {
    fn segment(self) -> &'static str {
        match self {
            InvoiceAction::Send => "send",
            InvoiceAction::Accept => "accept",
            InvoiceAction::Reject => "reject",
            InvoiceAction::Complete => "complete",
            InvoiceAction::Cancel => "cancel",
        }
    }
}

/// Expand `template`, refusing ids that are empty or would add path segments.
fn resource_path(template: &str, ids: &[&str]) -> Result<String, ApiError> {
    if let Some(id) = ids.iter().find(|id| id.trim().is_empty() || id.contains('/')) {
        return Err(ApiError::invalid_id(id));
    }
    Ok(expand_path(template, ids))
}

impl StreamClient {
    // User

    pub async fn me(&self) -> ApiResult {
        self.get(ME, None).await
    }

    // Consumers

    pub async fn create_consumer(&self, body: &Value) -> ApiResult {
        self.post(CONSUMERS, body).await
    }

    pub async fn get_consumer(&self, id: &str) -> ApiResult {
        self.get(&resource_path(CONSUMER, &[id])?, None).await
    }

    pub async fn list_consumers(&self, query: &QueryParams) -> ApiResult {
        self.get(CONSUMERS, Some(query)).await
    }

    pub async fn update_consumer(&self, id: &str, body: &Value) -> ApiResult {
        self.put(&resource_path(CONSUMER, &[id])?, body).await
    }

    pub async fn delete_consumer(&self, id: &str) -> ApiResult {
        self.delete(&resource_path(CONSUMER, &[id])?).await
    }

    // Products

    pub async fn create_product(&self, body: &Value) -> ApiResult {
        self.post(PRODUCTS, body).await
    }

    pub async fn get_product(&self, id: &str) -> ApiResult {
        self.get(&resource_path(PRODUCT, &[id])?, None).await
    }

    pub async fn list_products(&self, query: &QueryParams) -> ApiResult {
        self.get(PRODUCTS, Some(query)).await
    }

    pub async fn update_product(&self, id: &str, body: &Value) -> ApiResult {
        self.put(&resource_path(PRODUCT, &[id])?, body).await
    }

    pub async fn delete_product(&self, id: &str) -> ApiResult {
        self.delete(&resource_path(PRODUCT, &[id])?).await
    }

    // Subscriptions

    pub async fn create_subscription(&self, body: &Value) -> ApiResult {
        self.post(SUBSCRIPTIONS, body).await
    }

    pub async fn get_subscription(&self, id: &str) -> ApiResult {
        self.get(&resource_path(SUBSCRIPTION, &[id])?, None).await
    }

    pub async fn list_subscriptions(&self, query: &QueryParams) -> ApiResult {
        self.get(SUBSCRIPTIONS, Some(query)).await
    }

    pub async fn update_subscription(&self, id: &str, body: &Value) -> ApiResult {
        self.put(&resource_path(SUBSCRIPTION, &[id])?, body).await
    }

    pub async fn cancel_subscription(&self, id: &str, body: &Value) -> ApiResult {
        self.post(&resource_path(SUBSCRIPTION_ACTION, &[id, "cancel"])?, body)
            .await
    }

    pub async fn freeze_subscription(&self, id: &str, body: &Value) -> ApiResult {
        self.post(&resource_path(SUBSCRIPTION_FREEZES, &[id])?, body).await
    }

    pub async fn list_subscription_freezes(&self, id: &str, query: &QueryParams) -> ApiResult {
        self.get(&resource_path(SUBSCRIPTION_FREEZES, &[id])?, Some(query))
            .await
    }

    pub async fn update_subscription_freeze(
        &self,
        id: &str,
        freeze_id: &str,
        body: &Value,
    ) -> ApiResult {
        self.put(&resource_path(SUBSCRIPTION_FREEZE, &[id, freeze_id])?, body)
            .await
    }

    pub async fn delete_subscription_freeze(&self, id: &str, freeze_id: &str) -> ApiResult {
        self.delete(&resource_path(SUBSCRIPTION_FREEZE, &[id, freeze_id])?)
            .await
    }

    pub async fn unfreeze_subscription(&self, id: &str) -> ApiResult {
        self.post(&resource_path(SUBSCRIPTION_ACTION, &[id, "unfreeze"])?, &json!({}))
            .await
    }

    // Invoices

    pub async fn create_invoice(&self, body: &Value) -> ApiResult {
        self.post(INVOICES, body).await
    }

    pub async fn get_invoice(&self, id: &str) -> ApiResult {
        self.get(&resource_path(INVOICE, &[id])?, None).await
    }

    pub async fn list_invoices(&self, query: &QueryParams) -> ApiResult {
        self.get(INVOICES, Some(query)).await
    }

    pub async fn update_invoice_in_place(&self, id: &str, body: &Value) -> ApiResult {
        self.patch(&resource_path(INVOICE_IN_PLACE, &[id])?, body).await
    }

    pub async fn transition_invoice(&self, id: &str, action: InvoiceAction) -> ApiResult {
        self.post(
            &resource_path(INVOICE_ACTION, &[id, action.segment()])?,
            &json!({}),
        )
        .await
    }

    // Payments

    pub async fn get_payment(&self, id: &str) -> ApiResult {
        self.get(&resource_path(PAYMENT, &[id])?, None).await
    }

    pub async fn list_payments(&self, query: &QueryParams) -> ApiResult {
        self.get(PAYMENTS, Some(query)).await
    }

    pub async fn mark_payment_as_paid(&self, id: &str, body: &Value) -> ApiResult {
        self.post(&resource_path(PAYMENT_ACTION, &[id, "mark-paid"])?, body)
            .await
    }

    pub async fn refund_payment(&self, id: &str, body: &Value) -> ApiResult {
        self.post(&resource_path(PAYMENT_ACTION, &[id, "refund"])?, body)
            .await
    }

    pub async fn auto_charge_on_demand(&self, id: &str) -> ApiResult {
        self.post(&resource_path(PAYMENT_AUTO_CHARGE, &[id])?, &json!({}))
            .await
    }

    // Coupons

    pub async fn create_coupon(&self, body: &Value) -> ApiResult {
        self.post(COUPONS, body).await
    }

    pub async fn get_coupon(&self, id: &str) -> ApiResult {
        self.get(&resource_path(COUPON, &[id])?, None).await
    }

    pub async fn list_coupons(&self, query: &QueryParams) -> ApiResult {
        self.get(COUPONS, Some(query)).await
    }

    pub async fn update_coupon(&self, id: &str, body: &Value) -> ApiResult {
        self.put(&resource_path(COUPON, &[id])?, body).await
    }

    pub async fn delete_coupon(&self, id: &str) -> ApiResult {
        self.delete(&resource_path(COUPON, &[id])?).await
    }

    // Payment links

    pub async fn create_payment_link(&self, body: &Value) -> ApiResult {
        self.post(PAYMENT_LINKS, body).await
    }

    pub async fn get_payment_link(&self, id: &str) -> ApiResult {
        self.get(&resource_path(PAYMENT_LINK, &[id])?, None).await
    }

    pub async fn list_payment_links(&self, query: &QueryParams) -> ApiResult {
        self.get(PAYMENT_LINKS, Some(query)).await
    }

    pub async fn update_payment_link_status(&self, id: &str, body: &Value) -> ApiResult {
        self.patch(&resource_path(PAYMENT_LINK_STATUS, &[id])?, body).await
    }
}
