use tracing::debug;

use crate::{
    config::{Config, Environment, VarMap},
    error::{Error, Result},
};

/// Look up `name` and build its resolved variable set: `defaults` overlaid by
/// the environment's `vars`. Override is per top-level key; nested mappings
/// are replaced whole.
pub fn resolve_vars<'a>(cfg: &'a Config, name: &str) -> Result<(&'a Environment, VarMap)> {
    let env = cfg
        .environments
        .get(name)
        .ok_or_else(|| Error::EnvironmentNotFound {
            name: name.to_string(),
            available: cfg.environment_names(),
        })?;

    let vars = merge_vars(&cfg.defaults, &env.vars);
    debug!(env = name, vars = vars.len(), "resolved variables");
    Ok((env, vars))
}

pub fn merge_vars(defaults: &VarMap, overrides: &VarMap) -> VarMap {
    let mut out = defaults.clone();
    for (k, v) in overrides {
        out.insert(k.clone(), v.clone());
    }
    out
}
