//! Robots.txt parser implementation
//!
//! Allow/deny matching is delegated to the robotstxt crate; the directive
//! listing and Crawl-delay lookup are parsed from the raw lines here.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// `url` may be an absolute URL or a path. Empty content allows everything.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, robots_agent(user_agent), url)
    }

    /// Lists every non-empty `Disallow` value in file order, across all groups
    ///
    /// # Examples
    ///
    /// ```
    /// use site_audit::robots::ParsedRobots;
    ///
    /// let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin\nDisallow:");
    /// assert_eq!(robots.disallow_directives(), vec!["/admin".to_string()]);
    /// ```
    pub fn disallow_directives(&self) -> Vec<String> {
        self.directives()
            .filter(|(key, value)| key == "disallow" && !value.is_empty())
            .map(|(_, value)| value)
            .collect()
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A delay declared for a group naming the agent wins over the wildcard group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = robots_agent(user_agent).to_lowercase();

        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut wildcard_delay = None;
        let mut agent_delay = None;

        for (key, value) in self.directives() {
            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines share one group
                    if !group_open {
                        group.clear();
                        group_open = true;
                    }
                    group.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    group_open = false;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                        agent_delay = Some(delay);
                    } else if group.iter().any(|ua| ua == "*") {
                        wildcard_delay = Some(delay);
                    }
                }
                _ => group_open = false,
            }
        }

        agent_delay.or(wildcard_delay)
    }

    /// Iterates `(lowercase key, trimmed value)` pairs, skipping comments
    fn directives(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.content.lines().filter_map(|line| {
            let line = line.split('#').next().unwrap_or_default().trim();
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_lowercase(), value.trim().to_string()))
        })
    }
}

/// Reduces a full user-agent header to the product token robots.txt groups name
///
/// `"Mozilla/5.0 (X11; Linux x86_64)"` becomes `"Mozilla"`.
pub fn robots_agent(user_agent: &str) -> &str {
    let token = user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    if token.is_empty() {
        "*"
    } else {
        token
    }
}
