//! Known configuration keys

/// One `.env` key with its template text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigVar {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub example: Option<&'static str>,
}

pub const DA_CLIENT_ID: &str = "DA_CLIENT_ID";
pub const DA_CLIENT_SECRET: &str = "DA_CLIENT_SECRET";
pub const DA_REDIRECT_URI: &str = "DA_REDIRECT_URI";
pub const DA_REFRESH_TOKEN: &str = "DA_REFRESH_TOKEN";
pub const DA_ACCESS_TOKEN: &str = "DA_ACCESS_TOKEN";
pub const DA_OAUTH_SCOPE: &str = "DA_OAUTH_SCOPE";
pub const DA_CACHE_DIR: &str = "DA_CACHE_DIR";

/// Every key, in the order templates are written
pub const CONFIG_REGISTRY: &[ConfigVar] = &[
    ConfigVar {
        name: DA_CLIENT_ID,
        description: "OAuth2 client ID from the DeviantArt developer app settings.",
        required: true,
        example: Some("12345"),
    },
    ConfigVar {
        name: DA_CLIENT_SECRET,
        description: "OAuth2 client secret from the DeviantArt developer app settings.",
        required: true,
        example: Some("replace-me"),
    },
    ConfigVar {
        name: DA_REDIRECT_URI,
        description: "OAuth2 redirect URI configured on your DeviantArt app.",
        required: true,
        example: Some("http://localhost:8765/callback"),
    },
    ConfigVar {
        name: DA_REFRESH_TOKEN,
        description: "OAuth2 refresh token used to mint fresh access tokens.",
        required: false,
        example: Some("replace-me"),
    },
    ConfigVar {
        name: DA_ACCESS_TOKEN,
        description: "Current OAuth2 access token (optional cache).",
        required: false,
        example: Some("replace-me"),
    },
    ConfigVar {
        name: DA_OAUTH_SCOPE,
        description: "Scopes granted with the current tokens.",
        required: false,
        example: Some("browse user.manage"),
    },
    ConfigVar {
        name: DA_CACHE_DIR,
        description: "Directory for cached gallery listing responses.",
        required: false,
        example: None,
    },
];

impl ConfigVar {
    /// Commented template block appended to `.env` for a missing key
    pub fn template(&self) -> String {
        let mut lines = vec![format!("# {}", self.description)];
        if let Some(example) = self.example {
            lines.push(format!("# Example: {}", example));
        }
        lines.push(format!("{}=", self.name));
        lines.join("\n")
    }
}

/// Names of every required key
pub fn required_names() -> Vec<&'static str> {
    CONFIG_REGISTRY
        .iter()
        .filter(|var| var.required)
        .map(|var| var.name)
        .collect()
}

pub fn lookup(name: &str) -> Option<&'static ConfigVar> {
    CONFIG_REGISTRY.iter().find(|var| var.name == name)
}
