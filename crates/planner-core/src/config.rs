use std::collections::{
  BTreeSet,
  HashMap
};
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::filter::{
  FilterState,
  TimeWindow
};
use crate::task::Category;

pub const CONFIG_ENV: &str =
  "PLANNER_CONFIG";
pub const APP_DIR: &str =
  "month-planner";

/// Dotted keys flattened out of the
/// TOML file, with `--rc` overrides
/// applied on top.
#[derive(Debug, Clone)]
pub struct Config {
  map:             HashMap<String, String>,
  pub loaded_file: Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "display.color".to_string(),
      "true".to_string()
    );
    map.insert(
      "filters.weeks".to_string(),
      "0".to_string()
    );
    Self {
      map,
      loaded_file: None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match resolve_config_path(
      config_override
    ) {
      | Some(path) if path.exists() => {
        info!(config = %path.display(), "loading config");
        cfg.load_file(&path)?;
      }
      | Some(path) => {
        if config_override.is_some() {
          return Err(anyhow!(
            "config file {} does not \
             exist",
            path.display()
          ));
        }
        debug!(config = %path.display(), "no config file; using defaults");
      }
      | None => {
        warn!(
          "cannot locate a config \
           directory; using defaults"
        );
      }
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn color_enabled(&self) -> bool {
    self
      .get_bool("display.color")
      .unwrap_or(true)
  }

  /// Filters a command starts from
  /// before its own flags apply.
  pub fn default_filters(
    &self
  ) -> anyhow::Result<FilterState> {
    let mut filters =
      FilterState::default();

    if let Some(raw) =
      self.get("filters.weeks")
    {
      let weeks = raw
        .trim()
        .parse::<u8>()
        .with_context(|| {
          format!(
            "filters.weeks must be a \
             number, got {raw:?}"
          )
        })?;
      let window =
        TimeWindow::try_from(weeks)
          .map_err(|err| anyhow!(err))
          .context("invalid filters.weeks")?;
      filters.set_time_window(window);
    }

    if let Some(raw) =
      self.get("filters.categories")
    {
      let categories = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<Category>)
        .collect::<anyhow::Result<
          BTreeSet<_>
        >>()
        .context(
          "invalid filters.categories"
        )?;
      filters.categories = categories;
    }

    Ok(filters)
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let table = text
      .parse::<toml::Table>()
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })?;

    flatten_into(
      &mut self.map,
      "",
      &table
    );
    self.loaded_file = Some(path);
    Ok(())
  }
}

fn flatten_into(
  map: &mut HashMap<String, String>,
  prefix: &str,
  table: &toml::Table
) {
  for (key, value) in table {
    let key = if prefix.is_empty() {
      key.clone()
    } else {
      format!("{prefix}.{key}")
    };

    let text = match value {
      | toml::Value::Table(inner) => {
        flatten_into(map, &key, inner);
        continue;
      }
      | toml::Value::String(s) => {
        s.clone()
      }
      | toml::Value::Array(items) => {
        items
          .iter()
          .map(|item| match item {
            | toml::Value::String(s) => {
              s.clone()
            }
            | other => other.to_string()
          })
          .collect::<Vec<_>>()
          .join(",")
      }
      | other => other.to_string()
    };

    trace!(key = %key, value = %text, "loaded config key");
    map.insert(key, text);
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV)
    && !env_path.trim().is_empty()
  {
    return Some(PathBuf::from(
      env_path
    ));
  }

  dirs::config_dir().map(|dir| {
    dir.join(APP_DIR).join("planner.toml")
  })
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let base = dirs::data_dir()
    .or_else(dirs::home_dir)
    .ok_or_else(|| {
      anyhow!(
        "cannot determine a data \
         directory"
      )
    })?;
  Ok(base.join(APP_DIR))
}

pub fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_config(
    dir: &Path,
    text: &str
  ) -> PathBuf {
    let path = dir.join("planner.toml");
    fs::write(&path, text)
      .expect("write config");
    path
  }

  #[test]
  fn toml_tables_flatten_to_dotted_keys() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let path = write_config(
      dir.path(),
      r#"
[data]
location = "/tmp/planner-data"

[display]
color = false

[filters]
weeks = 2
categories = ["todo", "review"]
"#
    );

    let cfg = Config::load(Some(&path))
      .expect("load");
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("/tmp/planner-data")
    );
    assert!(!cfg.color_enabled());
    assert_eq!(
      cfg.loaded_file.as_deref(),
      Some(path.as_path())
    );

    let filters =
      cfg.default_filters().expect("filters");
    assert_eq!(
      filters.time_window,
      TimeWindow::Weeks(2)
    );
    assert_eq!(
      filters.categories,
      BTreeSet::from([
        Category::Todo,
        Category::Review
      ])
    );
  }

  #[test]
  fn overrides_win_over_file_values() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let path = write_config(
      dir.path(),
      "[display]\ncolor = true\n"
    );

    let mut cfg = Config::load(Some(&path))
      .expect("load");
    cfg.apply_overrides([
      (
        "rc.display.color".to_string(),
        "off".to_string()
      ),
      (
        "filters.weeks".to_string(),
        "1".to_string()
      )
    ]);
    assert!(!cfg.color_enabled());
    assert_eq!(
      cfg
        .default_filters()
        .expect("filters")
        .time_window,
      TimeWindow::Weeks(1)
    );
  }

  #[test]
  fn bad_filter_values_are_reported() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "filters.weeks".to_string(),
      "9".to_string()
    )]);
    assert!(cfg.default_filters().is_err());

    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "filters.categories".to_string(),
      "todo,someday".to_string()
    )]);
    assert!(cfg.default_filters().is_err());
  }

  #[test]
  fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let missing = dir.path().join("nope.toml");
    assert!(Config::load(Some(&missing)).is_err());
  }

  #[test]
  fn data_dir_override_is_created() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let target = dir.path().join("nested/data");
    let resolved = resolve_data_dir(
      &Config::default(),
      Some(&target)
    )
    .expect("resolve");
    assert_eq!(resolved, target);
    assert!(target.is_dir());
  }
}
