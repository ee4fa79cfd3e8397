//! Signed order operations: place, cancel, query.
//!
//! Every call follows the same path: build the parameters, let
//! [`ExchangeClient::submit`] stamp and sign them, route to the endpoint,
//! and decode the answer into [`OrderReport`]s. Failures are returned, never
//! swallowed; `err.code()` is `-1` for local transport failures and the
//! exchange's code for rejections.

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{Endpoint, ExchangeClient};
use crate::Result;
use crate::auth::QueryParams;
use crate::models::{OrderReport, OrderRequest, OrderSide, OrderType};

impl ExchangeClient {
    /// Places a good-til-cancelled order.
    ///
    /// With `test` set the order goes to the validation endpoint: the
    /// exchange checks it but nothing is executed and no balance moves.
    ///
    /// # Errors
    ///
    /// Returns a [`DipscanError`](crate::DipscanError) if the order is
    /// invalid, no credentials are configured, or the request fails.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
        test: bool,
    ) -> Result<OrderReport> {
        let request = OrderRequest::new(symbol, side, order_type, quantity, price);
        self.submit_order(&request, test).await
    }

    /// Places a prepared [`OrderRequest`]. Never retried.
    ///
    /// # Errors
    ///
    /// See [`place_order`](Self::place_order).
    pub async fn submit_order(&self, request: &OrderRequest, test: bool) -> Result<OrderReport> {
        let params = request.to_params(&self.prices, self.settings.recv_window)?;
        let endpoint = if test {
            Endpoint::TestOrder
        } else {
            Endpoint::Order
        };

        let report = self
            .signed_report(endpoint, &params)
            .await
            .inspect_err(|e| {
                warn!(
                    symbol = %request.symbol,
                    side = %request.side,
                    test,
                    code = ?e.code(),
                    error = %e,
                    "order placement failed"
                );
            })?;
        info!(
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = %request.quantity,
            price = %request.price,
            test,
            order_id = ?report.order_id,
            "order accepted"
        );
        Ok(report)
    }

    /// Cancels an open order.
    ///
    /// # Errors
    ///
    /// Returns a [`DipscanError`](crate::DipscanError) if no credentials
    /// are configured or the request fails.
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<OrderReport> {
        let params = self.order_params(symbol, Some(order_id));
        let report = self
            .signed_report(Endpoint::CancelOrder, &params)
            .await
            .inspect_err(|e| {
                warn!(symbol, order_id, code = ?e.code(), error = %e, "order cancellation failed");
            })?;
        info!(symbol, order_id, status = ?report.status, "order cancelled");
        Ok(report)
    }

    /// Fetches the status of one order.
    ///
    /// # Errors
    ///
    /// Returns a [`DipscanError`](crate::DipscanError) if no credentials
    /// are configured or the request fails.
    pub async fn get_order_info(&self, symbol: &str, order_id: u64) -> Result<OrderReport> {
        let params = self.order_params(symbol, Some(order_id));
        self.signed_report(Endpoint::QueryOrder, &params).await
    }

    /// Fetches every order (open, cancelled, filled) for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns a [`DipscanError`](crate::DipscanError) if no credentials
    /// are configured, the request fails, or the answer is not a list.
    pub async fn get_all_order_info(&self, symbol: &str) -> Result<Vec<OrderReport>> {
        let params = self.order_params(symbol, None);
        let value = self.submit(Endpoint::AllOrders, &params, true).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn order_params(&self, symbol: &str, order_id: Option<u64>) -> QueryParams {
        let mut params = QueryParams::new().with("symbol", symbol);
        if let Some(order_id) = order_id {
            params.push("orderId", order_id);
        }
        params.push("recvWindow", self.settings.recv_window);
        params
    }

    async fn signed_report(&self, endpoint: Endpoint, params: &QueryParams) -> Result<OrderReport> {
        let value = self.submit(endpoint, params, true).await?;
        Ok(serde_json::from_value(value)?)
    }
}
