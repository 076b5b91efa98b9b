use shared_types::EntityFeature;

pub const MSG_INVALID_FORM: &str = "Preencha os campos corretamente.";
pub const MSG_SEARCHING: &str = "Buscando entidades...";
pub const MSG_SEARCH_DONE: &str = "Busca concluida.";
pub const MSG_SEARCH_FAILED: &str = "Falha ao consultar a API.";
pub const MSG_CATALOG_LOADED: &str = "Entidades carregadas.";
pub const MSG_CATALOG_FAILED: &str = "Falha ao carregar entidades.";
pub const MSG_LOCATION_FOUND: &str = "Localizacao detectada.";
pub const MSG_LOCATION_FAILED: &str = "Nao foi possivel obter a localizacao.";
pub const MSG_LOCATION_UNSUPPORTED: &str = "Geolocalizacao nao suportada no navegador.";
pub const MSG_NO_RESULTS: &str = "Nenhuma entidade encontrada.";
pub const UNNAMED: &str = "Sem nome";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub message: String,
    pub tone: StatusTone,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Error,
        }
    }

    /// An error status from `err`, or `fallback` when it has no message.
    pub fn from_error(err: &impl std::fmt::Display, fallback: &str) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            Self::error(fallback)
        } else {
            Self::error(message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultList {
    /// Nothing matched; show a single placeholder line.
    Placeholder(&'static str),
    Entries(Vec<String>),
}

impl ResultList {
    /// Lists every non-base feature in order.
    pub fn from_features<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityFeature>,
    {
        let entries: Vec<String> = features
            .into_iter()
            .filter(|feature| !feature.is_base())
            .map(result_line)
            .collect();

        if entries.is_empty() {
            ResultList::Placeholder(MSG_NO_RESULTS)
        } else {
            ResultList::Entries(entries)
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            ResultList::Placeholder(text) => vec![text.to_string()],
            ResultList::Entries(entries) => entries.clone(),
        }
    }
}

/// `"<name> • <lat>, <lon>"` with coordinates to five decimals.
pub fn result_line(feature: &EntityFeature) -> String {
    let name = feature.name().unwrap_or(UNNAMED);
    let props = &feature.properties;
    format!(
        "{} • {}, {}",
        name,
        format_coordinate(props.lat),
        format_coordinate(props.lon)
    )
}

fn format_coordinate(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.5}"),
        None => "-".to_string(),
    }
}

pub fn count_label(count: usize) -> String {
    format!("{count} encontrados")
}

/// Raw contents of the search form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchForm {
    pub entity: String,
    pub range: String,
}

/// The UI side of the search page: form inputs, status, count and list.
pub trait SearchPanel {
    fn read_form(&self) -> SearchForm;
    fn set_entity_input(&self, entity: &str);
    fn set_status(&self, status: Status);
    fn set_count(&self, count: usize);
    fn clear_results(&self);
    fn show_results(&self, results: ResultList);
}
