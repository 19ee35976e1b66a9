//! Client sync controller: keeps one view consistent with the server.
//!
//! # Responsibility
//! - Re-fetch the list on every control change and after every mutation.
//! - Surface failures without corrupting the displayed records.
//!
//! # Invariants
//! - Mutations never patch local state; the display is always a re-fetch.
//! - The fallback sample set is used only when a list read gets no
//!   response at all, never for mutations.

use crate::error::{ClientError, TransportError};
use crate::form::EditForm;
use crate::query::{build_list_url, resource_url, ListControls};
use crate::state::{LoadTicket, ViewState};
use crate::transport::{ApiRequest, ApiResponse, CatalogTransport, HttpMethod};
use crate::view::ViewEntity;
use grimoire_core::query::{AppliedFilters, SortOrder};
use grimoire_core::{Envelope, RecordId};
use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Result of one list load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// The server was unreachable and local sample records are shown.
    Fallback(usize),
    /// Inline error shown; previous records kept.
    Failed(String),
    /// A newer load was issued before this one completed.
    Stale,
}

pub struct SyncController<R: ViewEntity, T: CatalogTransport> {
    transport: T,
    base: Url,
    state: ViewState<R>,
}

impl<R: ViewEntity, T: CatalogTransport> SyncController<R, T> {
    pub fn new(transport: T, base: Url) -> Self {
        Self {
            transport,
            base,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState<R> {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Loads the list for the current controls.
    pub fn refresh(&mut self) -> LoadOutcome {
        match self.begin_refresh() {
            Ok((ticket, request)) => {
                let result = self.transport.send(&request);
                self.finish_refresh(ticket, result)
            }
            Err(err) => LoadOutcome::Failed(err.to_string()),
        }
    }

    /// First half of [`refresh`](Self::refresh) for hosts that send
    /// requests themselves and may complete them out of order.
    pub fn begin_refresh(&mut self) -> Result<(LoadTicket, ApiRequest), ClientError> {
        let url = build_list_url::<R>(&self.base, self.state.controls())?;
        let ticket = self.state.begin_load();
        debug!("event=view_load module=client kind={} status=start url={url}", R::KIND);
        Ok((ticket, ApiRequest::get(url)))
    }

    pub fn finish_refresh(
        &mut self,
        ticket: LoadTicket,
        result: Result<ApiResponse, TransportError>,
    ) -> LoadOutcome {
        if !self.state.is_current(ticket) {
            debug!("event=view_load module=client kind={} status=stale", R::KIND);
            return LoadOutcome::Stale;
        }

        match result {
            Ok(response) => match decode_listing::<R>(&response) {
                Ok((records, applied)) => {
                    let count = records.len();
                    self.state.complete_listing(ticket, records, applied);
                    info!("event=view_load module=client kind={} status=ok count={count}", R::KIND);
                    LoadOutcome::Loaded(count)
                }
                Err(err) => self.fail(ticket, err.to_string()),
            },
            Err(err) => {
                let fallback = R::fallback_records();
                if fallback.is_empty() {
                    return self.fail(ticket, err.to_string());
                }
                let count = fallback.len();
                warn!(
                    "event=view_load module=client kind={} status=fallback count={count} error={err}",
                    R::KIND
                );
                self.state.complete_with_fallback(
                    ticket,
                    fallback,
                    format!("Showing sample {}: {err}", R::KIND.collection()),
                );
                LoadOutcome::Fallback(count)
            }
        }
    }

    fn fail(&mut self, ticket: LoadTicket, message: String) -> LoadOutcome {
        warn!("event=view_load module=client kind={} status=error error={message}", R::KIND);
        self.state.fail_load(ticket, message.clone());
        LoadOutcome::Failed(message)
    }

    /// Replaces every control at once without loading.
    pub fn set_controls(&mut self, controls: ListControls) {
        *self.state.controls_mut() = controls;
    }

    pub fn set_search(&mut self, text: impl Into<String>) -> LoadOutcome {
        self.state.controls_mut().search = text.into();
        self.refresh()
    }

    pub fn set_filter(&mut self, text: impl Into<String>) -> LoadOutcome {
        self.state.controls_mut().filter = text.into();
        self.refresh()
    }

    /// Ignored by views without a trait filter.
    pub fn set_trait_filter(&mut self, text: impl Into<String>) -> LoadOutcome {
        self.state.controls_mut().trait_filter = text.into();
        self.refresh()
    }

    pub fn set_sort(&mut self, key: impl Into<String>, order: SortOrder) -> LoadOutcome {
        let controls = self.state.controls_mut();
        controls.sort_by = key.into();
        controls.order = order;
        self.refresh()
    }

    /// Sets the controls from a server filter echo without loading, e.g. to
    /// restore a view after a restart.
    pub fn restore_controls(&mut self, applied: &AppliedFilters) {
        self.set_controls(ListControls::from(applied));
    }

    /// Clears every control to its default and reloads unfiltered.
    pub fn reset(&mut self) -> LoadOutcome {
        *self.state.controls_mut() = ListControls::default();
        self.refresh()
    }

    pub fn create(&mut self, draft: &R::Draft) -> Result<R, ClientError> {
        let url = resource_url(&self.base, R::KIND, None)?;
        let body = serde_json::to_value(draft).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.mutate("create", ApiRequest::with_json(HttpMethod::Post, url, body))
    }

    /// Edit form for a displayed record, built without a server round trip.
    pub fn open_edit(&self, id: RecordId) -> Result<EditForm, ClientError> {
        let record = self.state.find(id).ok_or(ClientError::NotDisplayed(id))?;
        Ok(EditForm {
            id,
            fields: record.edit_fields(),
        })
    }

    pub fn submit_edit(&mut self, form: &EditForm) -> Result<R, ClientError> {
        let url = resource_url(&self.base, R::KIND, Some(form.id))?;
        let body = R::update_payload(form);
        self.mutate("update", ApiRequest::with_json(HttpMethod::Put, url, body))
    }

    pub fn delete(&mut self, id: RecordId) -> Result<R, ClientError> {
        let url = resource_url(&self.base, R::KIND, Some(id))?;
        self.mutate("delete", ApiRequest::delete(url))
    }

    fn mutate(&mut self, operation: &str, request: ApiRequest) -> Result<R, ClientError> {
        let result = self
            .transport
            .send(&request)
            .map_err(ClientError::from)
            .and_then(|response| decode_data::<R>(&response));
        match &result {
            Ok(_) => {
                info!("event=view_{operation} module=client kind={} status=ok", R::KIND);
                self.refresh();
            }
            Err(err) => warn!(
                "event=view_{operation} module=client kind={} status=error error={err}",
                R::KIND
            ),
        }
        result
    }

    /// Uniformly random displayed record, `None` when nothing is shown.
    pub fn pick_random(&self) -> Option<&R> {
        self.pick_random_with(&mut rand::rng())
    }

    pub fn pick_random_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Option<&R> {
        self.state.records().choose(rng)
    }
}

fn decode_data<D: DeserializeOwned>(response: &ApiResponse) -> Result<D, ClientError> {
    let envelope = decode_envelope::<D>(response)?;
    envelope
        .data
        .ok_or_else(|| ClientError::Decode("envelope has no data".to_string()))
}

fn decode_listing<R: DeserializeOwned>(
    response: &ApiResponse,
) -> Result<(Vec<R>, Option<AppliedFilters>), ClientError> {
    let envelope = decode_envelope::<Vec<R>>(response)?;
    let records = envelope
        .data
        .ok_or_else(|| ClientError::Decode("envelope has no data".to_string()))?;
    Ok((records, envelope.filters))
}

fn decode_envelope<D: DeserializeOwned>(response: &ApiResponse) -> Result<Envelope<D>, ClientError> {
    let ok_status = (200..300).contains(&response.status);
    let envelope: Envelope<D> = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(_) if !ok_status => {
            return Err(ClientError::Api {
                status: response.status,
                message: response.body.trim().to_string(),
            })
        }
        Err(err) => return Err(ClientError::Decode(err.to_string())),
    };

    if !ok_status || !envelope.success {
        return Err(ClientError::Api {
            status: response.status,
            message: envelope
                .error
                .unwrap_or_else(|| format!("request failed with status {}", response.status)),
        });
    }
    Ok(envelope)
}
