use actix_web::{HttpRequest, HttpResponse, rt, web};
use actix_ws::Message;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::RequestIdExt;
use crate::services::auth::AuthService;
use crate::services::notification_hub::NotificationHub;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    pub user_id: i64,
    pub token: String,
}

/// Upgrades to a WebSocket that receives the user's push events.
///
/// Browsers cannot set headers on the upgrade, so the bearer token travels
/// in the query string and must belong to `userId`.
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    auth_service: web::Data<AuthService>,
    hub: web::Data<NotificationHub>,
    query: web::Query<WsQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let claims = auth_service
        .verify_token(&query.token)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;
    if claims.sub != query.user_id {
        return Err(AppError::Forbidden("Token does not match userId".to_string()).into());
    }

    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    let (conn_id, mut outbound) = hub.add(query.user_id).await;
    log::info!(
        "[{}] User {} subscribed to push events ({} open connections)",
        req.correlation_id().unwrap_or_default(),
        query.user_id,
        hub.connection_count().await
    );
    let hub = hub.into_inner();

    rt::spawn(async move {
        loop {
            tokio::select! {
                Some(payload) = outbound.recv() => {
                    if session.text(payload).await.is_err() {
                        break;
                    }
                }
                incoming = stream.recv() => match incoming {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::warn!("WebSocket protocol error on {}: {}", conn_id, e);
                        break;
                    }
                },
            }
        }

        if let Some(open_for) = hub.remove(&conn_id).await {
            log::info!(
                "WebSocket {} closed after {}s",
                conn_id,
                open_for.num_seconds()
            );
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}
