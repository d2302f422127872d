/// Facts about the operator's shell session, read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Project already selected in the shell; only used to pre-fill the prompt.
    pub detected_project: Option<String>,
    /// Running inside Google Cloud Shell.
    pub cloud_shell: bool,
}

impl Session {
    pub fn from_env() -> Self {
        Self::from_vars(|name| {
            std::env::var(name)
                // arch-lint: allow(no-silent-result-drop) reason="an unset or non-UTF-8 variable simply means nothing was detected"
                .ok()
        })
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let detected_project = ["GOOGLE_CLOUD_PROJECT", "DEVSHELL_PROJECT_ID"]
            .into_iter()
            .filter_map(&var)
            .map(|p| p.trim().to_owned())
            .find(|p| !p.is_empty());

        let cloud_shell = var("CLOUD_SHELL").is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Self {
            detected_project,
            cloud_shell,
        }
    }
}
