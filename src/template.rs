use std::path::Path;

use handlebars::{Handlebars, RenderError};
use serde::Serialize;

use crate::error::{self, Context};
use crate::config;

pub const GROUP_USER_ADD_SUBJECT: &str = "LU/group_user_add_subject";
pub const GROUP_USER_ADD: &str = "LU/group_user_add";

const BUILT_IN: [(&str, &str); 2] = [
    (
        GROUP_USER_ADD_SUBJECT,
        "{{admin.profile.first_name}} added you to the group {{group.name}}"
    ),
    (
        GROUP_USER_ADD,
        "Hi {{user.profile.first_name}},\n\
        \n\
        {{admin.profile.first_name}} {{admin.profile.last_name}} added you to the group \"{{group.name}}\".\n\
        {{#if user.groups_users.is_admin}}\
        You are a group manager and can add or remove members of this group.\n\
        {{else}}\
        You are a member of this group.\n\
        {{/if}}"
    ),
];

/// registry name for a template file, the path relative to the template
/// directory without the `.hbs` extension
fn registry_name(base: &Path, path: &Path) -> error::Result<String> {
    let stripped = path.strip_prefix(base)
        .context(format!("template file outside of directory: \"{}\"", path.display()))?
        .with_extension("");

    stripped.to_str()
        .map(|name| name.replace('\\', "/"))
        .context(format!("template file contains invalid UTF-8 characters: \"{}\"", path.display()))
}

fn load_template_directory(registry: &mut Handlebars<'_>, directory: &Path) -> error::Result<()> {
    use std::fs::read_dir;

    let mut dir_queue = vec![(
        directory.to_path_buf(),
        read_dir(directory).context("failed reading template directory")?
    )];

    while let Some((path, iter)) = dir_queue.pop() {
        tracing::debug!(path = %path.display(), "loading template directory");

        for item in iter {
            let entry = item?;
            let entry_path = entry.path();
            let entry_type = entry.file_type()
                .context("failed loading file type for template file")?;

            if entry_type.is_dir() {
                let entry_iter = read_dir(&entry_path)
                    .context("failed reading template files directory")?;

                dir_queue.push((entry_path, entry_iter));
            } else if entry_type.is_file() {
                if entry_path.extension().map(|ext| ext != "hbs").unwrap_or(true) {
                    continue;
                }

                let name = registry_name(directory, &entry_path)?;

                tracing::debug!(
                    name = name,
                    path = %entry_path.display(),
                    "handlebars template",
                );

                registry.register_template_file(&name, &entry_path)?;
            }
        }
    }

    Ok(())
}

/// email templates. the built in templates are registered first and may be
/// replaced by files of the same name in the configured directory
#[derive(Debug)]
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> error::Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in BUILT_IN {
            registry.register_template_string(name, template)?;
        }

        Ok(Templates {
            registry,
        })
    }

    pub fn from_config(config: &config::Config) -> error::Result<Self> {
        tracing::debug!("creating Templates state");

        let mut templates = Self::new()?;
        templates.registry.set_dev_mode(config.settings.templates.dev_mode);

        if let Some(directory) = &config.settings.templates.directory {
            load_template_directory(&mut templates.registry, directory)?;
        }

        Ok(templates)
    }

    pub fn render<T>(&self, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize
    {
        self.registry.render(name, data)
    }
}
