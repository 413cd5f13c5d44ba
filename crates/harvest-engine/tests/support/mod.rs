//! Scripted fake listing site for engine tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use harvest_checkpoint::{MemoryKeyValueStore, ResumeStore, keys};
use harvest_engine::{EngineOptions, SellerEngine};
use harvest_protocols::{
    AuxiliaryContext, BreadcrumbStep, FacetControl, KeyValueStore, ProbeError, StoreError,
    UiProbe,
};

pub const OUT_OF_STOCK_ID: &str = "include_out_of_stock";

/// How one seller behaves when filtered for.
#[derive(Debug, Clone)]
pub struct SellerScript {
    pub id: String,
    pub disabled: bool,
    /// Checkbox disappears from the live panel after enumeration.
    pub checkbox_vanishes: bool,
    pub listing_loads: bool,
    pub product: Option<String>,
    pub popup_blocked: bool,
    pub context_ready: bool,
    /// Only this many product opens ever finish loading.
    pub ready_opens: Option<usize>,
    pub link_found: bool,
    pub contact_tab: bool,
    /// Contact region text per read; the last entry repeats.
    pub contact: Vec<Option<String>>,
    /// Apply action throws.
    pub apply_fails: bool,
    /// Closing the product context navigates the main page away.
    pub loses_listing: bool,
}

pub fn contact_block(name: &str, email: &str) -> String {
    format!(
        "Legal Business Name: {name} Headquarters: 1 Main St\nAnytown Contact us: {email}"
    )
}

pub fn seller(id: &str) -> SellerScript {
    SellerScript {
        id: id.to_string(),
        disabled: false,
        checkbox_vanishes: false,
        listing_loads: true,
        product: Some(format!("https://shop.example/p/{id}")),
        popup_blocked: false,
        context_ready: true,
        ready_opens: None,
        link_found: true,
        contact_tab: true,
        contact: vec![Some(contact_block(&format!("{id} LLC"), &format!("{id}@mail.example")))],
        apply_fails: false,
        loses_listing: false,
    }
}

impl SellerScript {
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn checkbox_vanishes(mut self) -> Self {
        self.checkbox_vanishes = true;
        self
    }

    pub fn listing_fails(mut self) -> Self {
        self.listing_loads = false;
        self
    }

    pub fn no_product(mut self) -> Self {
        self.product = None;
        self
    }

    pub fn popup_blocked(mut self) -> Self {
        self.popup_blocked = true;
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.context_ready = false;
        self
    }

    pub fn ready_for_opens(mut self, opens: usize) -> Self {
        self.ready_opens = Some(opens);
        self
    }

    pub fn no_seller_link(mut self) -> Self {
        self.link_found = false;
        self
    }

    pub fn no_contact_tab(mut self) -> Self {
        self.contact_tab = false;
        self
    }

    pub fn contact_reads(mut self, reads: Vec<Option<&str>>) -> Self {
        self.contact = reads.into_iter().map(|r| r.map(str::to_string)).collect();
        self
    }

    pub fn apply_fails(mut self) -> Self {
        self.apply_fails = true;
        self
    }

    pub fn loses_listing(mut self) -> Self {
        self.loses_listing = true;
        self
    }
}

/// Everything observable the engine did to the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ClickFacet(String),
    Apply,
    Open(String),
    Close(String),
    GoBack,
    Reload,
}

struct SiteState {
    sellers: Vec<SellerScript>,
    modal_open: bool,
    group_open: bool,
    checked: Vec<String>,
    on_listing: bool,
    product: Option<String>,
    /// `open_filters` clicks that do nothing.
    dead_filter_clicks: usize,
    go_back_restores: bool,
    reload_restores: bool,
    events: Vec<Event>,
    contact_reads: usize,
    cancel_after_closes: Option<(usize, CancellationToken)>,
}

impl SiteState {
    fn panel_open(&self) -> bool {
        self.modal_open && self.group_open
    }

    fn seller(&self, id: &str) -> Option<&SellerScript> {
        self.sellers.iter().find(|s| s.id == id)
    }

    fn seller_for_product(&self, url: &str) -> Option<SellerScript> {
        self.sellers
            .iter()
            .find(|s| s.product.as_deref() == Some(url))
            .cloned()
    }

    fn closes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Close(_)))
            .count()
    }
}

pub struct FakeSite {
    state: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn new(sellers: Vec<SellerScript>) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(SiteState {
                sellers,
                modal_open: false,
                group_open: false,
                checked: Vec::new(),
                on_listing: true,
                product: None,
                dead_filter_clicks: 0,
                go_back_restores: true,
                reload_restores: true,
                events: Vec::new(),
                contact_reads: 0,
                cancel_after_closes: None,
            })),
        })
    }

    pub fn with_dead_filter_clicks(self: Arc<Self>, clicks: usize) -> Arc<Self> {
        self.state.lock().dead_filter_clicks = clicks;
        self
    }

    pub fn without_history(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().go_back_restores = false;
        self
    }

    /// Neither history back nor reload brings the listing back.
    pub fn listing_unrecoverable(self: Arc<Self>) -> Arc<Self> {
        {
            let mut state = self.state.lock();
            state.go_back_restores = false;
            state.reload_restores = false;
        }
        self
    }

    pub fn check(&self, id: &str) {
        self.state.lock().checked.push(id.to_string());
    }

    pub fn cancel_after_closes(&self, closes: usize, token: CancellationToken) {
        self.state.lock().cancel_after_closes = Some((closes, token));
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    pub fn opens(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Open(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes()
    }

    pub fn checked(&self) -> Vec<String> {
        self.state.lock().checked.clone()
    }

    pub fn contact_reads(&self) -> usize {
        self.state.lock().contact_reads
    }

    /// Seller facets whose filter was applied, in order.
    pub fn filtered_sellers(&self) -> Vec<String> {
        let events = self.events();
        let mut sellers = Vec::new();
        let mut last_click = None;
        for event in events {
            match event {
                Event::ClickFacet(id) => last_click = Some(id),
                Event::Apply => {
                    if let Some(id) = last_click.take() {
                        sellers.push(id);
                    }
                }
                _ => {}
            }
        }
        sellers
    }

    /// Open a product context directly, bypassing the listing.
    pub fn context_for(&self, seller_id: &str) -> FakeContext {
        let script = self
            .state
            .lock()
            .seller(seller_id)
            .cloned()
            .expect("unknown seller");
        FakeContext::new(self.state.clone(), script)
    }
}

#[async_trait]
impl UiProbe for FakeSite {
    async fn is_modal_open(&self) -> Result<bool, ProbeError> {
        Ok(self.state.lock().modal_open)
    }

    async fn facet_control_count(&self) -> Result<usize, ProbeError> {
        let state = self.state.lock();
        Ok(if state.panel_open() {
            state.sellers.len() + 1
        } else {
            0
        })
    }

    async fn is_listing_page(&self) -> Result<bool, ProbeError> {
        Ok(self.state.lock().on_listing)
    }

    async fn open_filters(&self) -> Result<bool, ProbeError> {
        let mut state = self.state.lock();
        if state.dead_filter_clicks > 0 {
            state.dead_filter_clicks -= 1;
        } else if state.on_listing {
            state.modal_open = true;
        }
        Ok(true)
    }

    async fn open_seller_group(&self) -> Result<bool, ProbeError> {
        let mut state = self.state.lock();
        if !state.modal_open {
            return Ok(false);
        }
        state.group_open = true;
        Ok(true)
    }

    async fn close_modal(&self) -> Result<bool, ProbeError> {
        let mut state = self.state.lock();
        state.modal_open = false;
        state.group_open = false;
        Ok(true)
    }

    async fn facet_controls(&self) -> Result<Vec<FacetControl>, ProbeError> {
        let state = self.state.lock();
        if !state.panel_open() {
            return Ok(Vec::new());
        }
        let mut controls = vec![FacetControl::new(OUT_OF_STOCK_ID, false)];
        controls.extend(
            state
                .sellers
                .iter()
                .map(|s| FacetControl::new(s.id.clone(), s.disabled)),
        );
        Ok(controls)
    }

    async fn checked_facets(&self) -> Result<Vec<String>, ProbeError> {
        let state = self.state.lock();
        Ok(if state.panel_open() {
            state.checked.clone()
        } else {
            Vec::new()
        })
    }

    async fn click_facet(&self, facet_id: &str) -> Result<bool, ProbeError> {
        let mut state = self.state.lock();
        if !state.panel_open() {
            return Ok(false);
        }
        let present = facet_id == OUT_OF_STOCK_ID
            || state
                .seller(facet_id)
                .is_some_and(|s| !s.checkbox_vanishes);
        if !present {
            return Ok(false);
        }

        state.events.push(Event::ClickFacet(facet_id.to_string()));
        if let Some(pos) = state.checked.iter().position(|id| id == facet_id) {
            state.checked.remove(pos);
        } else {
            state.checked.push(facet_id.to_string());
        }
        Ok(true)
    }

    async fn apply_filters(&self) -> Result<bool, ProbeError> {
        let mut state = self.state.lock();
        if !state.modal_open {
            return Ok(false);
        }

        let selected: Vec<SellerScript> = state
            .checked
            .iter()
            .filter_map(|id| state.seller(id).cloned())
            .collect();
        if selected.iter().any(|s| s.apply_fails) {
            return Err(ProbeError::Script("apply handler threw".to_string()));
        }

        state.events.push(Event::Apply);
        state.modal_open = false;
        state.group_open = false;
        match selected.as_slice() {
            [only] => {
                state.on_listing = only.listing_loads;
                state.product = only.product.clone();
            }
            _ => {
                state.on_listing = true;
                state.product = None;
            }
        }
        Ok(true)
    }

    async fn first_product_link(&self) -> Result<Option<String>, ProbeError> {
        let state = self.state.lock();
        Ok(if state.on_listing {
            state.product.clone()
        } else {
            None
        })
    }

    async fn open_context(&self, url: &str) -> Result<Box<dyn AuxiliaryContext>, ProbeError> {
        let mut state = self.state.lock();
        let mut script = state
            .seller_for_product(url)
            .ok_or_else(|| ProbeError::ContextUnavailable(format!("unknown product {url}")))?;
        if script.popup_blocked {
            return Err(ProbeError::ContextUnavailable("popup blocked".to_string()));
        }
        let earlier_opens = state
            .events
            .iter()
            .filter(|e| matches!(e, Event::Open(u) if u == url))
            .count();
        if script.ready_opens.is_some_and(|ready| earlier_opens >= ready) {
            script.context_ready = false;
        }
        state.events.push(Event::Open(url.to_string()));
        drop(state);
        Ok(Box::new(FakeContext::new(self.state.clone(), script)))
    }

    async fn go_back(&self) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        state.events.push(Event::GoBack);
        if state.go_back_restores {
            state.on_listing = true;
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        state.events.push(Event::Reload);
        if state.reload_restores {
            state.on_listing = true;
        }
        state.modal_open = false;
        state.group_open = false;
        Ok(())
    }

    async fn category_name(&self) -> Result<Option<String>, ProbeError> {
        Ok(Some("Laptops".to_string()))
    }

    async fn breadcrumbs(&self) -> Result<Vec<BreadcrumbStep>, ProbeError> {
        Ok(vec![
            BreadcrumbStep::new("Electronics", "https://shop.example/c/electronics"),
            BreadcrumbStep::new("Laptops", "https://shop.example/c/laptops"),
        ])
    }
}

pub struct FakeContext {
    site: Arc<Mutex<SiteState>>,
    script: SellerScript,
    on_seller_page: AtomicBool,
    reads: AtomicUsize,
    closed: AtomicBool,
}

impl FakeContext {
    fn new(site: Arc<Mutex<SiteState>>, script: SellerScript) -> Self {
        Self {
            site,
            script,
            on_seller_page: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuxiliaryContext for FakeContext {
    async fn is_ready(&self) -> Result<bool, ProbeError> {
        Ok(self.script.context_ready)
    }

    async fn click_text_match(&self, _text: &str, _tags: &str) -> Result<bool, ProbeError> {
        if self.script.link_found {
            self.on_seller_page.store(true, Ordering::SeqCst);
        }
        Ok(self.script.link_found)
    }

    async fn current_url(&self) -> Result<String, ProbeError> {
        if self.on_seller_page.load(Ordering::SeqCst) {
            Ok(format!("https://shop.example/sellers/{}", self.script.id))
        } else {
            Ok(self.script.product.clone().unwrap_or_default())
        }
    }

    async fn has_contact_tab(&self) -> Result<bool, ProbeError> {
        Ok(self.on_seller_page.load(Ordering::SeqCst) && self.script.contact_tab)
    }

    async fn click_contact_tab(&self) -> Result<bool, ProbeError> {
        Ok(self.script.contact_tab)
    }

    async fn contact_text(&self) -> Result<Option<String>, ProbeError> {
        self.site.lock().contact_reads += 1;
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        let per_context = self.script.contact.len().max(1);
        let index = read.min(per_context - 1);
        Ok(self.script.contact.get(index).cloned().flatten())
    }

    async fn close(&self) -> Result<(), ProbeError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut state = self.site.lock();
        state.events.push(Event::Close(
            self.script.product.clone().unwrap_or_default(),
        ));
        if self.script.loses_listing {
            state.on_listing = false;
        }
        if let Some((after, token)) = &state.cancel_after_closes {
            if state.closes() >= *after {
                token.cancel();
            }
        }
        Ok(())
    }
}

/// Memory store that also remembers every cursor value written.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryKeyValueStore,
    cursor_writes: Mutex<Vec<usize>>,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn cursor_writes(&self) -> Vec<usize> {
        self.cursor_writes.lock().clone()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        for (key, value) in &entries {
            if key == keys::CURRENT_SELLER_INDEX {
                if let Some(cursor) = value.as_u64() {
                    self.cursor_writes.lock().push(cursor as usize);
                }
            }
        }
        self.inner.set_many(entries).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.inner.remove(keys).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.keys().await
    }
}

pub struct Harness {
    pub site: Arc<FakeSite>,
    pub backend: Arc<RecordingStore>,
    pub store: ResumeStore,
    pub engine: Arc<SellerEngine>,
}

pub fn harness(site: Arc<FakeSite>) -> Harness {
    harness_with(site, EngineOptions::default())
}

pub fn harness_with(site: Arc<FakeSite>, options: EngineOptions) -> Harness {
    let backend = Arc::new(RecordingStore::default());
    let store = ResumeStore::new(backend.clone());
    let engine = Arc::new(SellerEngine::new(site.clone(), store.clone(), options));
    Harness {
        site,
        backend,
        store,
        engine,
    }
}
