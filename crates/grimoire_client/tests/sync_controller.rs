use grimoire_client::{
    parse_base_url, ApiRequest, ApiResponse, CatalogTransport, ClientError, HttpMethod,
    LoadOutcome, Phase, SyncController, TransportError,
};
use grimoire_core::query::{AppliedFilters, SortOrder};
use grimoire_core::{House, Spell, SpellDraft};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays scripted responses and records every request it receives.
#[derive(Default)]
struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    sent: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn reply(&self, status: u16, body: Value) {
        self.replies.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    fn fail(&self, err: TransportError) {
        self.replies.borrow_mut().push_back(Err(err));
    }

    fn sent(&self) -> Vec<ApiRequest> {
        self.sent.borrow().clone()
    }
}

impl CatalogTransport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {} {}", request.method.as_str(), request.url))
    }
}

fn listing(records: &[Value]) -> Value {
    json!({"success": true, "data": records, "count": records.len()})
}

fn spell_json(spell: &Spell) -> Value {
    serde_json::to_value(spell).unwrap()
}

fn spells_controller() -> SyncController<Spell, ScriptedTransport> {
    SyncController::new(
        ScriptedTransport::default(),
        parse_base_url("http://localhost:3000").unwrap(),
    )
}

fn houses_controller() -> SyncController<House, ScriptedTransport> {
    SyncController::new(
        ScriptedTransport::default(),
        parse_base_url("http://localhost:3000").unwrap(),
    )
}

#[test]
fn initial_refresh_displays_server_records() {
    let mut controller = spells_controller();
    let lumos = Spell::new("Lumos", "Charm", "Creates light");
    controller.transport().reply(200, listing(&[spell_json(&lumos)]));

    assert_eq!(controller.state().phase(), Phase::Idle);
    assert_eq!(controller.refresh(), LoadOutcome::Loaded(1));
    assert_eq!(controller.state().phase(), Phase::Displaying);
    assert_eq!(controller.state().records(), [lumos]);

    let sent = controller.transport().sent();
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(sent[0].url.as_str(), "http://localhost:3000/api/spells");
}

#[test]
fn control_changes_refetch_with_encoded_query() {
    let mut controller = houses_controller();
    controller.transport().reply(200, listing(&[]));
    controller.transport().reply(200, listing(&[]));
    controller.transport().reply(200, listing(&[]));

    controller.set_search("salt & pepper");
    controller.set_trait_filter("brav");
    controller.set_sort("head", SortOrder::Desc);

    let urls: Vec<String> = controller
        .transport()
        .sent()
        .iter()
        .map(|request| request.url.to_string())
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://localhost:3000/api/houses?search=salt+%26+pepper",
            "http://localhost:3000/api/houses?search=salt+%26+pepper&trait=brav",
            "http://localhost:3000/api/houses?search=salt+%26+pepper&trait=brav&sortBy=head&order=desc",
        ]
    );
}

#[test]
fn filter_echo_is_kept_and_restores_controls() {
    let mut controller = spells_controller();
    let echo = json!({"search": "lum", "type": null, "sortBy": "name", "order": "desc"});
    controller.transport().reply(
        200,
        json!({"success": true, "data": [], "count": 0, "filters": echo}),
    );
    controller.set_search("lum");

    let applied = controller.state().applied_filters().cloned().unwrap();
    assert!(matches!(applied, AppliedFilters::Spells(_)));

    let mut restored = spells_controller();
    restored.restore_controls(&applied);
    assert_eq!(restored.state().controls().search, "lum");
    assert_eq!(restored.state().controls().sort_by, "name");
    assert_eq!(restored.state().controls().order, SortOrder::Desc);
    assert!(restored.transport().sent().is_empty());

    controller
        .transport()
        .fail(TransportError::Unreachable("connection refused".to_string()));
    controller.refresh();
    assert!(controller.state().applied_filters().is_none());
}

#[test]
fn reset_clears_controls_and_reloads_unfiltered() {
    let mut controller = spells_controller();
    controller.transport().reply(200, listing(&[]));
    controller.transport().reply(200, listing(&[]));

    controller.set_filter("curse");
    controller.reset();

    assert_eq!(controller.state().controls().filter, "");
    assert_eq!(controller.state().controls().order, SortOrder::Asc);
    let sent = controller.transport().sent();
    assert_eq!(sent[1].url.query(), None);
}

#[test]
fn create_refetches_instead_of_patching_locally() {
    let mut controller = spells_controller();
    let lumos = Spell::new("Lumos", "Charm", "Creates light");
    let nox = Spell::new("Nox", "Charm", "Ends Lumos");
    controller
        .transport()
        .reply(201, json!({"success": true, "data": spell_json(&nox), "message": "Spell created successfully"}));
    controller
        .transport()
        .reply(200, listing(&[spell_json(&lumos), spell_json(&nox)]));

    let created = controller
        .create(&SpellDraft::new("Nox", "Charm", "Ends Lumos"))
        .unwrap();
    assert_eq!(created, nox);
    assert_eq!(controller.state().records(), [lumos, nox]);

    let sent = controller.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(
        sent[0].body,
        Some(json!({"name": "Nox", "type": "Charm", "description": "Ends Lumos"}))
    );
    assert_eq!(sent[1].method, HttpMethod::Get);
}

#[test]
fn rejected_create_reports_error_and_keeps_display() {
    let mut controller = spells_controller();
    let lumos = Spell::new("Lumos", "Charm", "Creates light");
    controller.transport().reply(200, listing(&[spell_json(&lumos)]));
    controller.refresh();

    controller
        .transport()
        .reply(400, json!({"success": false, "error": "Spell already exists"}));
    let err = controller
        .create(&SpellDraft::new("Lumos", "Charm", "Creates light"))
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Api {
            status: 400,
            message: "Spell already exists".to_string()
        }
    );
    assert_eq!(controller.state().records(), [lumos]);
    assert_eq!(controller.transport().sent().len(), 2);
}

#[test]
fn unreachable_server_falls_back_to_sample_spells() {
    let mut controller = spells_controller();
    controller
        .transport()
        .fail(TransportError::Unreachable("connection refused".to_string()));

    assert_eq!(controller.refresh(), LoadOutcome::Fallback(5));
    assert!(controller.state().is_fallback());
    assert!(controller.state().error().is_some());
    assert_eq!(controller.state().records()[0].name, "Expelliarmus");
}

#[test]
fn unreachable_server_keeps_houses_displayed() {
    let mut controller = houses_controller();
    let house = House::new("Gryffindor");
    controller
        .transport()
        .reply(200, listing(&[serde_json::to_value(&house).unwrap()]));
    controller.refresh();

    controller.transport().fail(TransportError::Timeout);
    let outcome = controller.set_search("claw");

    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    assert_eq!(controller.state().records(), [house]);
    assert!(!controller.state().is_fallback());
}

#[test]
fn server_error_on_list_is_inline_not_fallback() {
    let mut controller = spells_controller();
    controller
        .transport()
        .reply(500, json!({"success": false, "error": "disk I/O error"}));

    assert_eq!(
        controller.refresh(),
        LoadOutcome::Failed("disk I/O error".to_string())
    );
    assert!(!controller.state().is_fallback());
    assert!(controller.state().records().is_empty());
}

#[test]
fn mutation_transport_failure_never_uses_fallback() {
    let mut controller = spells_controller();
    controller
        .transport()
        .fail(TransportError::Unreachable("connection refused".to_string()));

    let err = controller
        .create(&SpellDraft::new("Lumos", "Charm", "Creates light"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(controller.state().records().is_empty());
    assert_eq!(controller.transport().sent().len(), 1);
}

#[test]
fn edit_form_is_prepopulated_without_request_and_submits_full_fields() {
    let mut controller = spells_controller();
    let lumos = Spell::new("Lumos", "Charm", "Creates light");
    controller.transport().reply(200, listing(&[spell_json(&lumos)]));
    controller.refresh();

    let mut form = controller.open_edit(lumos.id).unwrap();
    assert_eq!(controller.transport().sent().len(), 1);
    assert_eq!(form.value("description"), "Creates light");

    form.set("description", "Emits a beam of light").unwrap();
    let mut updated = lumos.clone();
    updated.description = "Emits a beam of light".to_string();
    controller
        .transport()
        .reply(200, json!({"success": true, "data": spell_json(&updated)}));
    controller.transport().reply(200, listing(&[spell_json(&updated)]));

    assert_eq!(controller.submit_edit(&form).unwrap(), updated);
    let sent = controller.transport().sent();
    assert_eq!(sent[1].method, HttpMethod::Put);
    assert_eq!(
        sent[1].url.as_str(),
        format!("http://localhost:3000/api/spells/{}", lumos.id)
    );
    assert_eq!(
        sent[1].body,
        Some(json!({"name": "Lumos", "type": "Charm", "description": "Emits a beam of light"}))
    );
    assert_eq!(controller.state().records(), [updated]);
}

#[test]
fn open_edit_requires_displayed_record() {
    let controller = spells_controller();
    let stranger = Spell::new("Crucio", "Curse", "Inflicts pain");
    assert_eq!(
        controller.open_edit(stranger.id).unwrap_err(),
        ClientError::NotDisplayed(stranger.id)
    );
}

#[test]
fn delete_then_refetch() {
    let mut controller = houses_controller();
    let house = House::new("Slytherin");
    controller
        .transport()
        .reply(200, listing(&[serde_json::to_value(&house).unwrap()]));
    controller.refresh();

    controller
        .transport()
        .reply(200, json!({"success": true, "data": serde_json::to_value(&house).unwrap()}));
    controller.transport().reply(200, listing(&[]));

    assert_eq!(controller.delete(house.id).unwrap(), house);
    assert!(controller.state().records().is_empty());
    assert_eq!(controller.transport().sent()[1].method, HttpMethod::Delete);
}

#[test]
fn out_of_order_completion_does_not_render_stale_list() {
    let mut controller = spells_controller();
    let old = Spell::new("Accio", "Charm", "Summons objects");
    let new = Spell::new("Lumos", "Charm", "Creates light");

    let (first, _) = controller.begin_refresh().unwrap();
    let (second, _) = controller.begin_refresh().unwrap();

    let reply = |spell: &Spell| {
        Ok(ApiResponse {
            status: 200,
            body: listing(&[spell_json(spell)]).to_string(),
        })
    };
    assert_eq!(controller.finish_refresh(second, reply(&new)), LoadOutcome::Loaded(1));
    assert_eq!(controller.finish_refresh(first, reply(&old)), LoadOutcome::Stale);
    assert_eq!(controller.state().records(), [new]);
}

#[test]
fn pick_random_chooses_among_displayed_houses() {
    let mut controller = houses_controller();
    assert!(controller.pick_random().is_none());

    let houses = [House::new("Gryffindor"), House::new("Hufflepuff")];
    let values: Vec<Value> = houses
        .iter()
        .map(|house| serde_json::to_value(house).unwrap())
        .collect();
    controller.transport().reply(200, listing(&values));
    controller.refresh();

    for _ in 0..20 {
        let picked = controller.pick_random().unwrap();
        assert!(houses.contains(picked));
    }
}
