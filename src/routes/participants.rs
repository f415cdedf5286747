use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{geodesic_km, round2, Pairer};
use crate::models::{
    ErrorResponse, HealthResponse, MatchedPartner, Participant, SubmitRequest, SubmitResponse,
};
use crate::services::{ParticipantStore, RelayClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ParticipantStore>,
    pub relay: Arc<RelayClient>,
    pub pairer: Pairer,
    pub admin_token: String,
    // Serializes read-candidates -> decide -> write-both-sides, so two
    // concurrent submissions cannot claim the same partner.
    pub pairing_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Configure participant-facing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/submit", web::post().to(submit))
        .route("/participants/{phone}", web::get().to(get_participant));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Submission endpoint
///
/// POST /api/v1/submit
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "phone": "string",
///   "location": { "lat": 25.2, "lng": 55.3 }
/// }
/// ```
///
/// Upserts the participant (phone is the key), runs the pairing engine if
/// they are unmatched, and reports the partner when a pair forms. Relay
/// notification happens after the response path commits and never blocks it.
async fn submit(
    state: web::Data<AppState>,
    req: web::Json<SubmitRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submission: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // One pairing decision at a time; held until both sides are written
    let _guard = state.pairing_lock.lock().await;

    let participant = match state
        .store
        .upsert_by_phone(&req.name, &req.phone, req.location.lat, req.location.lng)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to store submission for {}: {}", req.phone, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to store submission".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let population = match state.store.list_all().await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to load population: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load participants".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // A matched participant keeps its pair across resubmissions; report the
    // existing partner unchanged.
    if let Some(partner_id) = participant.matched_with {
        let matched = population
            .iter()
            .find(|p| p.id == partner_id)
            .map(|partner| partner_info(&participant, partner));
        return HttpResponse::Ok().json(SubmitResponse {
            status: "success".to_string(),
            participant_id: participant.id,
            matched,
        });
    }

    let result = state.pairer.decide(&participant, &population);
    tracing::debug!(
        "Pairing decision for {}: {:?} ({} candidates)",
        participant.id,
        result.decision,
        result.candidates_considered
    );

    let Some(decision) = result.decision else {
        return HttpResponse::Ok().json(SubmitResponse {
            status: "success".to_string(),
            participant_id: participant.id,
            matched: None,
        });
    };

    let Some(partner) = population.iter().find(|p| p.id == decision.partner_id) else {
        // decide() only picks partners out of the population it was handed
        tracing::error!("Chosen partner {} missing from population", decision.partner_id);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Pairing failed".to_string(),
            message: "chosen partner disappeared".to_string(),
            status_code: 500,
        });
    };

    if let Err(e) = state.store.record_pair(participant.id, partner.id).await {
        tracing::error!(
            "Failed to persist pair {} <-> {}: {}",
            participant.id,
            partner.id,
            e
        );
        // Neither side was written; the client may simply resubmit
        let response = ErrorResponse {
            error: "Pairing write failed, retry the submission".to_string(),
            message: e.to_string(),
            status_code: if e.is_retryable() { 503 } else { 500 },
        };
        return if e.is_retryable() {
            HttpResponse::ServiceUnavailable().json(response)
        } else {
            HttpResponse::InternalServerError().json(response)
        };
    }

    let distance_km = round2(decision.distance_km);

    tracing::info!(
        "Paired {} with {} at {:.2} km",
        participant.name,
        partner.name,
        distance_km
    );

    // Fire-and-forget notification; failures are logged inside notify_pair
    let relay = Arc::clone(&state.relay);
    let a = participant.clone();
    let b = partner.clone();
    tokio::spawn(async move {
        relay.notify_pair(&a, &b, distance_km).await;
    });

    HttpResponse::Ok().json(SubmitResponse {
        status: "success".to_string(),
        participant_id: participant.id,
        matched: Some(partner_info(&participant, partner)),
    })
}

/// Lookup endpoint
///
/// GET /api/v1/participants/{phone}
async fn get_participant(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let phone = path.into_inner();

    match state.store.find_by_phone(&phone).await {
        Ok(Some(participant)) => HttpResponse::Ok().json(participant),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Participant not found".to_string(),
            message: format!("No participant with phone {}", phone),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to look up {}: {}", phone, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Lookup failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn partner_info(subject: &Participant, partner: &Participant) -> MatchedPartner {
    let distance = geodesic_km(
        subject.latitude,
        subject.longitude,
        partner.latitude,
        partner.longitude,
    );
    MatchedPartner {
        name: partner.name.clone(),
        phone: partner.phone.clone(),
        distance_km: round2(distance),
    }
}
