//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (ver `migrations/`).

pub mod auth;
pub mod car;
pub mod notification;
pub mod payment;
pub mod reservation;
pub mod user;
