use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_net::http::Request;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, FormData, HtmlButtonElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement,
};

use crate::config;
use crate::dom::{self, ClassList};
use crate::notification::{Notification, Notify};
use crate::storage::KeyValueStore;

pub type FormFields = BTreeMap<String, String>;

const SUCCESS_MESSAGE: &str =
    "Thank you for your talk request! I'll get back to you within 24 hours.";
const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("{0}")]
    Rejected(String),
    #[error("Something went wrong!")]
    Unexpected,
    #[error("network error: {0}")]
    Network(String),
    #[error("could not read the form: {0}")]
    Unreadable(String),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        format!(
            "Sorry, there was an error submitting your request ({self}). Please try again or email me directly."
        )
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: String,
}

pub fn interpret(response: &RawResponse) -> Result<(), SubmitError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    match serde_json::from_str::<ErrorBody>(&response.body) {
        Ok(body) if !body.errors.is_empty() => {
            let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
            Err(SubmitError::Rejected(messages.join(", ")))
        }
        _ => Err(SubmitError::Unexpected),
    }
}

pub trait FormSurface {
    // What actually goes over the wire; `fields` only feeds the autosave.
    type Payload;

    fn payload(&self) -> Result<Self::Payload, String>;
    fn fields(&self) -> FormFields;
    fn set_field(&self, name: &str, value: &str);
    fn reset(&self);
    fn set_loading(&self, loading: bool);
}

#[allow(async_fn_in_trait)]
pub trait FormTransport<P> {
    async fn post(&self, endpoint: &str, payload: P) -> Result<RawResponse, String>;
}

pub struct Autosave<S> {
    store: S,
}

impl<S: KeyValueStore> Autosave<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, fields: &FormFields) {
        match serde_json::to_string(fields) {
            Ok(json) => self.store.set(config::FORM_AUTOSAVE_KEY, &json),
            Err(e) => log::warn!("could not serialise form draft: {e}"),
        }
    }

    // Only non-empty strings come back; other JSON values are skipped.
    pub fn load(&self) -> Result<Option<FormFields>, serde_json::Error> {
        let Some(raw) = self.store.get(config::FORM_AUTOSAVE_KEY) else {
            return Ok(None);
        };
        let saved: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
        let fields = saved
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(s) if !s.is_empty() => Some((name, s)),
                _ => None,
            })
            .collect();
        Ok(Some(fields))
    }

    // A corrupt draft is logged and left alone.
    pub fn restore_into(&self, form: &impl FormSurface) -> usize {
        match self.load() {
            Ok(Some(fields)) => {
                for (name, value) in &fields {
                    form.set_field(name, value);
                }
                fields.len()
            }
            Ok(None) => 0,
            Err(e) => {
                log::error!("Error restoring form data: {e}");
                0
            }
        }
    }

    pub fn clear(&self) {
        self.store.remove(config::FORM_AUTOSAVE_KEY);
    }
}

pub struct ContactForm<F, T, S, N> {
    surface: F,
    transport: T,
    autosave: Autosave<S>,
    notifier: N,
    endpoint: String,
}

impl<F, T, S, N> ContactForm<F, T, S, N>
where
    F: FormSurface,
    T: FormTransport<F::Payload>,
    S: KeyValueStore,
    N: Notify,
{
    pub fn new(surface: F, transport: T, autosave: Autosave<S>, notifier: N, endpoint: String) -> Self {
        Self {
            surface,
            transport,
            autosave,
            notifier,
            endpoint,
        }
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn autosave(&self) -> &Autosave<S> {
        &self.autosave
    }

    // The button leaves the loading state whatever happens.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        // An empty email is left to the form's own `required` handling.
        let email = self.surface.fields().remove("email").unwrap_or_default();
        if !email.is_empty() && !validate_email(&email) {
            self.notifier.notify(Notification::error(INVALID_EMAIL_MESSAGE));
            return Err(SubmitError::Rejected(INVALID_EMAIL_MESSAGE.to_string()));
        }

        self.surface.set_loading(true);
        let outcome = match self.surface.payload() {
            Ok(payload) => match self.transport.post(&self.endpoint, payload).await {
                Ok(response) => interpret(&response),
                Err(e) => Err(SubmitError::Network(e)),
            },
            Err(e) => Err(SubmitError::Unreadable(e)),
        };

        match &outcome {
            Ok(()) => {
                log::info!("talk request submitted");
                self.notifier.notify(Notification::success(SUCCESS_MESSAGE));
                self.surface.reset();
                self.autosave.clear();
            }
            Err(e) => {
                log::error!("Form submission error: {e}");
                self.notifier.notify(Notification::error(e.user_message()));
            }
        }
        self.surface.set_loading(false);
        outcome
    }
}

// Autosave snapshot of one control; unchecked boxes and buttons contribute nothing.
fn control_value(control: &Element) -> Option<String> {
    if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
        return match input.type_().as_str() {
            "checkbox" | "radio" => input.checked().then(|| input.value()),
            "submit" | "button" | "reset" | "image" | "file" => None,
            _ => Some(input.value()),
        };
    }
    if let Some(area) = control.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    control.dyn_ref::<HtmlSelectElement>().map(|select| select.value())
}

fn set_control_value(control: &Element, value: &str) {
    if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
        if !matches!(input.type_().as_str(), "checkbox" | "radio" | "file") {
            input.set_value(value);
        }
    } else if let Some(area) = control.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    }
}

const CONTROLS: &str = "input[name], textarea[name], select[name]";

pub struct BrowserForm {
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
}

impl BrowserForm {
    fn controls(&self) -> Vec<Element> {
        dom::query_within(&self.form, CONTROLS)
    }
}

impl FormSurface for BrowserForm {
    type Payload = FormData;

    fn payload(&self) -> Result<FormData, String> {
        FormData::new_with_form(&self.form).map_err(|e| format!("{e:?}"))
    }

    fn fields(&self) -> FormFields {
        self.controls()
            .iter()
            .filter_map(|control| {
                let name = control.get_attribute("name")?;
                Some((name, control_value(control)?))
            })
            .collect()
    }

    fn set_field(&self, name: &str, value: &str) {
        let target = self
            .controls()
            .into_iter()
            .find(|control| control.get_attribute("name").as_deref() == Some(name));
        if let Some(control) = target {
            set_control_value(&control, value);
        }
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn set_loading(&self, loading: bool) {
        let Some(button) = &self.button else {
            return;
        };
        if loading {
            button.add_class("loading");
        } else {
            button.remove_class("loading");
        }
        button.set_disabled(loading);
    }
}

pub struct HttpTransport;

impl FormTransport<FormData> for HttpTransport {
    async fn post(&self, endpoint: &str, payload: FormData) -> Result<RawResponse, String> {
        let response = Request::post(endpoint)
            .header("Accept", "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(RawResponse { status, body })
    }
}

pub fn install<S, N>(document: &Document, store: S, notifier: N) -> Result<(), JsValue>
where
    S: KeyValueStore + 'static,
    N: Notify + 'static,
{
    let Some(form) = document
        .get_element_by_id("talkRequestForm")
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        return Ok(());
    };
    let button = document
        .get_element_by_id("submitTalkRequest")
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
    let endpoint = form.get_attribute("action").unwrap_or_default();

    let surface = BrowserForm {
        form: form.clone(),
        button,
    };
    let contact = Rc::new(ContactForm::new(
        surface,
        HttpTransport,
        Autosave::new(store),
        notifier,
        endpoint.clone(),
    ));

    let restored = contact.autosave().restore_into(contact.surface());
    if restored > 0 {
        log::debug!("restored {restored} saved form fields");
    }

    for control in dom::query_within(&form, "input, textarea, select") {
        let contact = contact.clone();
        dom::listen(&control, "input", move |_: Event| {
            contact.autosave().save(&contact.surface().fields());
        })?;
    }

    if endpoint.is_empty() {
        log::warn!("talk request form has no action, submissions disabled");
        return Ok(());
    }

    dom::listen(&form, "submit", move |event: Event| {
        event.prevent_default();
        let contact = contact.clone();
        spawn_local(async move {
            let _ = contact.submit().await;
        });
    })?;

    log::info!("talk request form wired to {endpoint}");
    Ok(())
}
