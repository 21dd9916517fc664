use url::Url;

/// Just a wrapper around the base API URL and the bearer token used against it
#[derive(Clone, Debug)]
pub struct Resource {
    base_url: Url,
    token: Option<String>,
}

impl Resource {
    pub fn new(base_url: Url) -> Self {
        Self { base_url, token: None }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Build the absolute URL of an API route by appending `path` to the base URL path
    pub fn route(&self, path: &str) -> Url {
        let mut built = self.base_url.clone();
        let new_path = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        built.set_path(&new_path);
        built
    }

    /// The server origin (path stripped), which is what the connectivity probe pings
    pub fn origin(&self) -> Url {
        let mut built = self.base_url.clone();
        built.set_path("/");
        built
    }
}
