use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use sysinfo::System;

use crate::{constants::{HEALTH_CACHE_SECS, START_TIME}, AppState};

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    storage_backend: String,
    storage: String,
    version: String,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> =
    Lazy::new(|| RwLock::new(HealthCheckResponse::default()));

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0);
    let human_uptime = format_duration(Duration::from_secs(uptime_secs.unsigned_abs()));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let (status, storage) = match state.repos.check_connection().await {
        Ok(()) => ("healthy", "OK"),
        Err(_) => ("degraded", "Unavailable"),
    };

    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| {
            format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
        });

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        storage_backend: state.repos.backend_name().to_string(),
        storage: storage.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
        system: system_info,
    }
}

/// Service health, recomputed at most every few seconds.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > HEALTH_CACHE_SECS {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);
        return HttpResponse::Ok().json(response);
    }

    let cached = CACHED_STATUS.read().clone();
    HttpResponse::Ok().json(cached)
}
