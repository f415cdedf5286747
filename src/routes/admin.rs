use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::core::list_pairs;
use crate::models::{DeleteResponse, ErrorResponse, OverviewResponse};
use crate::routes::participants::AppState;

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/overview", web::get().to(overview))
        .route("/admin/participants/{id}", web::delete().to(delete_participant));
}

/// Static-token check for the admin surface
///
/// The token comes from configuration and is compared against the
/// X-Admin-Token header. An empty configured token locks the surface
/// entirely rather than opening it.
fn authorized(req: &HttpRequest, state: &AppState) -> bool {
    if state.admin_token.is_empty() {
        return false;
    }
    req.headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .map(|token| token == state.admin_token)
        .unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "Unauthorized".to_string(),
        message: "Missing or invalid admin token".to_string(),
        status_code: 401,
    })
}

/// Admin overview: every participant plus the reconstructed pair list
///
/// GET /api/v1/admin/overview
///
/// Pair distances are recomputed from current coordinates on every call,
/// never served from a stored value.
async fn overview(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state) {
        return unauthorized();
    }

    let participants = match state.store.list_all().await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to load participants for overview: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load participants".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let pairings = list_pairs(&participants);

    tracing::debug!(
        "Overview: {} participants, {} pairs",
        participants.len(),
        pairings.len()
    );

    HttpResponse::Ok().json(OverviewResponse {
        participants,
        pairings,
    })
}

/// Admin deletion
///
/// DELETE /api/v1/admin/participants/{id}
///
/// Removing a matched participant also clears the partner's back-reference,
/// in the same transaction, so the partner goes back to the candidate pool.
async fn delete_participant(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    if !authorized(&req, &state) {
        return unauthorized();
    }

    let id = path.into_inner();

    match state.store.delete(id).await {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse { deleted: true, id }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Participant not found".to_string(),
            message: format!("No participant with id {}", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to delete participant {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Delete failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
