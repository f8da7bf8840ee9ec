//! bookings.rs
//!
//! Репозиторий бронирований: create / list / get / update / delete поверх
//! `DocumentStore`.
//!
//! Все операции по id возвращают `Lookup`: отсутствие записи — это значение
//! `Lookup::NotFound`, а не ошибка. Ошибкой (`RepositoryError`) считаются
//! невалидный id и сбои хранилища. Для update/delete `Lookup<OperationReply>`
//! сворачивается в привычный ответ `{message}` / `{error: "Ticket not found"}`
//! через `into_reply()`.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::models::booking::{TICKET_DELETED, TICKET_UPDATED};
use crate::models::{Lookup, OperationReply, TicketBooking, TicketBookingView};
use crate::store::{Document, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid ticket id: {0}")]
    InvalidId(#[from] uuid::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode ticket booking: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Maps a raw store document to its view model. Mistyped fields read as null.
pub fn serialize_booking(document: &Document) -> TicketBookingView {
    TicketBookingView::from_document(document)
}

fn parse_id(id: &str) -> Result<Uuid, RepositoryError> {
    Ok(Uuid::parse_str(id)?)
}

fn log_store_failure(operation: &'static str) -> impl Fn(StoreError) -> StoreError {
    move |e| {
        error!("{} store error: {:?}", operation, e);
        e
    }
}

#[derive(Clone)]
pub struct BookingRepository {
    store: Arc<dyn DocumentStore>,
}

impl BookingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stores the set fields of `booking` and returns the stored record with
    /// its new id.
    #[instrument(skip(self, booking))]
    pub async fn create(&self, booking: &TicketBooking) -> Result<TicketBookingView, RepositoryError> {
        let body = booking.to_fields()?;
        let id = self
            .store
            .insert_one(body.clone())
            .await
            .map_err(log_store_failure("create"))?;

        debug!(%id, fields = body.len(), "ticket booking created");
        Ok(serialize_booking(&Document { id, body }))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TicketBookingView>, RepositoryError> {
        let documents = self.store.find().await.map_err(log_store_failure("list"))?;
        Ok(documents.iter().map(serialize_booking).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Lookup<TicketBookingView>, RepositoryError> {
        let id = parse_id(id)?;
        let document = self
            .store
            .find_one(id)
            .await
            .map_err(log_store_failure("get_by_id"))?;

        let booking: Lookup<TicketBookingView> = document.as_ref().map(serialize_booking).into();
        if !booking.is_found() {
            debug!(%id, "ticket booking not found");
        }
        Ok(booking)
    }

    /// Partial merge: only the fields provided on `changes` are overwritten,
    /// an explicit null clears the stored value.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: &str,
        changes: &TicketBooking,
    ) -> Result<Lookup<OperationReply>, RepositoryError> {
        let id = parse_id(id)?;
        let patch = changes.to_fields()?;
        let matched = self
            .store
            .update_one(id, patch)
            .await
            .map_err(log_store_failure("update"))?;

        if matched == 0 {
            debug!(%id, "update: ticket booking not found");
            return Ok(Lookup::NotFound);
        }
        Ok(Lookup::Found(OperationReply::message(TICKET_UPDATED)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Lookup<OperationReply>, RepositoryError> {
        let id = parse_id(id)?;
        let deleted = self
            .store
            .delete_one(id)
            .await
            .map_err(log_store_failure("delete"))?;

        if deleted == 0 {
            debug!(%id, "delete: ticket booking not found");
            return Ok(Lookup::NotFound);
        }
        Ok(Lookup::Found(OperationReply::message(TICKET_DELETED)))
    }
}
