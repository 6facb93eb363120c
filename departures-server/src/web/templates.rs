//! Askama templates for the settings page.

use askama::Template;

use crate::domain::Settings;

use super::dto::SettingsForm;

/// Installation settings page.
#[derive(Template)]
#[template(path = "manage.html")]
pub struct ManageTemplate {
    pub form: SettingsView,
    pub message: Option<String>,
    pub error: Option<String>,
    pub demo_mode: bool,
}

/// Settings form values as displayed; unset fields are blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsView {
    pub bus_stop: String,
    pub bus_direction: String,
    pub train_station: String,
    pub train_destination: String,
    pub min_train_time: String,
    pub app_id: String,
    pub app_key: String,
}

impl SettingsView {
    pub fn from_settings(settings: &Settings) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            bus_stop: text(&settings.bus_stop),
            bus_direction: text(&settings.bus_direction),
            train_station: text(&settings.train_station),
            train_destination: text(&settings.train_destination),
            min_train_time: settings
                .min_train_time
                .map(|m| m.to_string())
                .unwrap_or_default(),
            app_id: text(&settings.app_id),
            app_key: text(&settings.app_key),
        }
    }

    /// Echo a rejected submission back unchanged.
    pub fn from_form(form: &SettingsForm) -> Self {
        Self {
            bus_stop: form.bus_stop.clone(),
            bus_direction: form.bus_direction.clone(),
            train_station: form.train_station.clone(),
            train_destination: form.train_destination.clone(),
            min_train_time: form.min_train_time.clone(),
            app_id: form.app_id.clone(),
            app_key: form.app_key.clone(),
        }
    }
}
