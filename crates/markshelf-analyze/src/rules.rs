//! Categorization rule tables.
//!
//! Every table is an ordered association list; lookups return the first
//! matching entry. Built-in tables are static, and a [`RuleSet`] can be
//! extended with user rules that take precedence over them.

use std::collections::HashSet;

use markshelf_core::{CategorizeConfig, RuleEntry};

/// Domain rules. An entry with a `/` also requires the path to match.
pub const DOMAIN_RULES: &[(&str, &str)] = &[
    // Development
    ("github.com", "Development"),
    ("gitlab.com", "Development"),
    ("bitbucket.org", "Development"),
    ("stackoverflow.com", "Development"),
    ("medium.com", "Technology & Development"),
    ("dev.to", "Development"),
    ("hackerrank.com", "Development"),
    ("leetcode.com", "Development"),
    ("codepen.io", "Web Development"),
    ("npmjs.com", "Web Development"),
    ("pypi.org", "Python Development"),
    ("kaggle.com", "Data Science"),
    // Media
    ("youtube.com", "Videos"),
    ("youtu.be", "Videos"),
    ("vimeo.com", "Videos"),
    ("twitch.tv", "Streaming"),
    ("netflix.com", "Entertainment"),
    ("hulu.com", "Entertainment"),
    ("spotify.com", "Music"),
    ("soundcloud.com", "Music"),
    ("bandcamp.com", "Music"),
    ("deezer.com", "Music"),
    ("apple.com/music", "Music"),
    // Social
    ("linkedin.com", "Professional"),
    ("facebook.com", "Social Media"),
    ("twitter.com", "Social Media"),
    ("instagram.com", "Social Media"),
    ("pinterest.com", "Social Media"),
    ("reddit.com", "Social Media"),
    ("tumblr.com", "Social Media"),
    ("tiktok.com", "Social Media"),
    ("snapchat.com", "Social Media"),
    ("discord.com", "Communication"),
    ("slack.com", "Communication"),
    // Shopping
    ("amazon.com", "Shopping"),
    ("amazon.co.uk", "Shopping"),
    ("amazon.de", "Shopping"),
    ("ebay.com", "Shopping"),
    ("etsy.com", "Shopping"),
    ("aliexpress.com", "Shopping"),
    ("walmart.com", "Shopping"),
    ("target.com", "Shopping"),
    ("bestbuy.com", "Shopping"),
    // News and reference
    ("nytimes.com", "News"),
    ("washingtonpost.com", "News"),
    ("bbc.com", "News"),
    ("bbc.co.uk", "News"),
    ("cnn.com", "News"),
    ("theguardian.com", "News"),
    ("reuters.com", "News"),
    ("apnews.com", "News"),
    ("wikipedia.org", "Reference"),
    // Productivity
    ("notion.so", "Productivity"),
    ("trello.com", "Productivity"),
    ("asana.com", "Productivity"),
    ("evernote.com", "Productivity"),
    ("todoist.com", "Productivity"),
    ("google.com/docs", "Documents"),
    ("google.com/sheets", "Spreadsheets"),
    ("google.com/drive", "Cloud Storage"),
    ("dropbox.com", "Cloud Storage"),
    ("onedrive.live.com", "Cloud Storage"),
    ("docs.microsoft.com", "Documentation"),
    // Learning
    ("coursera.org", "Education"),
    ("udemy.com", "Education"),
    ("edx.org", "Education"),
    ("khanacademy.org", "Education"),
    ("udacity.com", "Education"),
    ("pluralsight.com", "Technology Education"),
    ("freecodecamp.org", "Web Development Education"),
    // Finance
    ("finance.yahoo.com", "Finance"),
    ("marketwatch.com", "Finance"),
    ("bloomberg.com", "Finance"),
    ("investopedia.com", "Finance Education"),
    ("paypal.com", "Payment"),
    ("chase.com", "Banking"),
    ("bankofamerica.com", "Banking"),
    ("wellsfargo.com", "Banking"),
    // Travel
    ("booking.com", "Travel"),
    ("airbnb.com", "Travel"),
    ("expedia.com", "Travel"),
    ("tripadvisor.com", "Travel"),
    ("maps.google.com", "Maps"),
    // Communication
    ("gmail.com", "Email"),
    ("outlook.com", "Email"),
    ("yahoo.com/mail", "Email"),
    ("zoom.us", "Video Conferencing"),
    ("meet.google.com", "Video Conferencing"),
];

/// Top-level-domain rules.
pub const TLD_RULES: &[(&str, &str)] = &[
    ("edu", "Education"),
    ("gov", "Government"),
    ("org", "Non-profit"),
    ("io", "Technology"),
    ("dev", "Development"),
    ("tech", "Technology"),
    ("ai", "Artificial Intelligence"),
    ("shop", "Shopping"),
    ("store", "Shopping"),
    ("blog", "Blogs"),
    ("news", "News"),
];

/// Path substring rules, matched against the lowercased URL path.
pub const PATH_RULES: &[(&str, &str)] = &[
    ("/blog", "Blog"),
    ("/docs", "Documentation"),
    ("/documentation", "Documentation"),
    ("/learn", "Learning"),
    ("/courses", "Courses"),
    ("/news", "News"),
    ("/shop", "Shopping"),
    ("/store", "Shopping"),
    ("/product", "Product"),
    ("/forum", "Forum"),
    ("/community", "Community"),
    ("/support", "Support"),
    ("/help", "Help"),
    ("/faq", "FAQ"),
    ("/wiki", "Wiki"),
    ("/about", "About"),
    ("/contact", "Contact"),
];

/// Title keyword rules, matched against significant title words.
pub const TITLE_KEYWORDS: &[(&str, &str)] = &[
    ("tutorial", "Tutorials"),
    ("course", "Courses"),
    ("learn", "Learning"),
    ("guide", "Guides"),
    ("howto", "How-To"),
    ("documentation", "Documentation"),
    ("reference", "Reference"),
    ("cheatsheet", "Cheat Sheets"),
    ("recipe", "Recipes"),
    ("blog", "Blogs"),
    ("news", "News"),
    ("article", "Articles"),
    ("review", "Reviews"),
    ("shop", "Shopping"),
    ("store", "Shopping"),
    ("buy", "Shopping"),
    ("product", "Products"),
    ("tool", "Tools"),
    ("service", "Services"),
    ("api", "APIs"),
    ("download", "Downloads"),
    ("game", "Games"),
    ("video", "Videos"),
    ("music", "Music"),
    ("audio", "Audio"),
    ("podcast", "Podcasts"),
    ("book", "Books"),
    ("paper", "Research Papers"),
    ("research", "Research"),
    ("job", "Jobs"),
    ("career", "Careers"),
    ("portfolio", "Portfolios"),
    ("project", "Projects"),
    ("forum", "Forums"),
    ("community", "Communities"),
    ("dashboard", "Dashboards"),
    ("analytics", "Analytics"),
    ("report", "Reports"),
    ("login", "Logins"),
    ("account", "Accounts"),
    ("profile", "Profiles"),
];

/// A domain rule, optionally restricted to URLs whose path contains `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRule {
    pub domain: String,
    pub path: Option<String>,
    pub category: String,
}

impl DomainRule {
    /// Parse a `domain` or `domain/path` pattern.
    pub fn new(pattern: &str, category: impl Into<String>) -> Self {
        let pattern = pattern.trim().to_lowercase();
        let pattern = pattern.strip_prefix("www.").unwrap_or(&pattern);
        let (domain, path) = match pattern.split_once('/') {
            Some((domain, path)) if !path.is_empty() => (domain, Some(path.to_string())),
            Some((domain, _)) => (domain, None),
            None => (pattern, None),
        };
        Self {
            domain: domain.to_string(),
            path,
            category: category.into(),
        }
    }

    /// Check if a www-stripped host and lowercased path satisfy this rule.
    ///
    /// The host matches when it equals the rule domain or is a subdomain of it.
    pub fn matches(&self, host: &str, path: &str) -> bool {
        let host_matches = host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));

        host_matches && self.path.as_deref().is_none_or(|p| path.contains(p))
    }
}

/// The rule tables a categorizer consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    domains: Vec<DomainRule>,
    tlds: Vec<(String, String)>,
    paths: Vec<(String, String)>,
    keywords: Vec<(String, String)>,
}

impl RuleSet {
    /// The built-in tables.
    pub fn builtin() -> Self {
        Self {
            domains: DOMAIN_RULES
                .iter()
                .map(|(pattern, category)| DomainRule::new(pattern, *category))
                .collect(),
            tlds: owned(TLD_RULES),
            paths: owned(PATH_RULES),
            keywords: owned(TITLE_KEYWORDS),
        }
    }

    /// Tables with no rules at all.
    pub fn empty() -> Self {
        Self {
            domains: Vec::new(),
            tlds: Vec::new(),
            paths: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Built-in tables preceded by the extra rules from the configuration.
    pub fn from_config(config: &CategorizeConfig) -> Self {
        let builtin = Self::builtin();
        let extra = |entries: &[RuleEntry], lowercase: bool| -> Vec<(String, String)> {
            entries
                .iter()
                .map(|rule| {
                    let pattern = if lowercase {
                        rule.pattern.to_lowercase()
                    } else {
                        rule.pattern.clone()
                    };
                    (pattern, rule.category.clone())
                })
                .collect()
        };

        Self {
            domains: config
                .domain_rules
                .iter()
                .map(|rule| DomainRule::new(&rule.pattern, rule.category.as_str()))
                .chain(builtin.domains)
                .collect(),
            tlds: extra(&config.tld_rules, true)
                .into_iter()
                .map(|(tld, category)| (tld.trim_start_matches('.').to_string(), category))
                .chain(builtin.tlds)
                .collect(),
            paths: extra(&config.path_rules, true)
                .into_iter()
                .chain(builtin.paths)
                .collect(),
            keywords: extra(&config.title_keywords, true)
                .into_iter()
                .chain(builtin.keywords)
                .collect(),
        }
    }

    /// Append a domain rule.
    pub fn with_domain_rule(mut self, pattern: &str, category: impl Into<String>) -> Self {
        self.domains.push(DomainRule::new(pattern, category));
        self
    }

    /// Append a TLD rule.
    pub fn with_tld_rule(mut self, tld: &str, category: impl Into<String>) -> Self {
        self.tlds.push((tld.to_lowercase(), category.into()));
        self
    }

    /// Append a path rule.
    pub fn with_path_rule(mut self, fragment: &str, category: impl Into<String>) -> Self {
        self.paths.push((fragment.to_lowercase(), category.into()));
        self
    }

    /// Append a title keyword.
    pub fn with_title_keyword(mut self, keyword: &str, category: impl Into<String>) -> Self {
        self.keywords.push((keyword.to_lowercase(), category.into()));
        self
    }

    /// Category of the first domain rule matching the host and path.
    pub fn match_domain(&self, host: &str, path: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|rule| rule.matches(host, path))
            .map(|rule| rule.category.as_str())
    }

    /// Category for a top-level domain label.
    pub fn match_tld(&self, tld: &str) -> Option<&str> {
        let tld = tld.to_lowercase();
        lookup(&self.tlds, |pattern| *pattern == tld)
    }

    /// Category of the first path rule contained in the lowercased path.
    pub fn match_path(&self, path: &str) -> Option<&str> {
        lookup(&self.paths, |fragment| path.contains(fragment))
    }

    /// Category of the first keyword present in the token set.
    pub fn match_keyword(&self, tokens: &HashSet<String>) -> Option<&str> {
        lookup(&self.keywords, |keyword| tokens.contains(keyword))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn owned(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(pattern, category)| (pattern.to_string(), category.to_string()))
        .collect()
}

fn lookup<'a>(
    table: &'a [(String, String)],
    mut matches: impl FnMut(&String) -> bool,
) -> Option<&'a str> {
    table
        .iter()
        .find(|(pattern, _)| matches(pattern))
        .map(|(_, category)| category.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_rule_matching() {
        let rules = RuleSet::builtin();

        assert_eq!(rules.match_domain("github.com", "/rust-lang"), Some("Development"));
        assert_eq!(rules.match_domain("gist.github.com", "/"), Some("Development"));
        assert_eq!(rules.match_domain("notgithub.com", "/"), None);
        assert_eq!(rules.match_domain("github.com.evil.org", "/"), None);
    }

    #[test]
    fn test_domain_rule_with_path() {
        let rules = RuleSet::builtin();

        assert_eq!(rules.match_domain("apple.com", "/music/playlist"), Some("Music"));
        assert_eq!(rules.match_domain("apple.com", "/iphone"), None);
        assert_eq!(rules.match_domain("google.com", "/drive/u/0"), Some("Cloud Storage"));
        assert_eq!(rules.match_domain("maps.google.com", "/"), Some("Maps"));
    }

    #[test]
    fn test_tld_path_keyword_lookups() {
        let rules = RuleSet::builtin();

        assert_eq!(rules.match_tld("EDU"), Some("Education"));
        assert_eq!(rules.match_tld("com"), None);
        assert_eq!(rules.match_path("/en/docs/intro"), Some("Documentation"));
        assert_eq!(rules.match_path("/blog/docs"), Some("Blog"));

        let tokens: HashSet<String> = ["rust", "guide", "tutorial"].map(String::from).into();
        assert_eq!(rules.match_keyword(&tokens), Some("Tutorials"));
    }

    #[test]
    fn test_config_rules_take_precedence() {
        let config = CategorizeConfig {
            domain_rules: vec![RuleEntry::new("github.com", "Code")],
            tld_rules: vec![RuleEntry::new(".rs", "Rust")],
            ..CategorizeConfig::default()
        };
        let rules = RuleSet::from_config(&config);

        assert_eq!(rules.match_domain("github.com", "/"), Some("Code"));
        assert_eq!(rules.match_tld("rs"), Some("Rust"));
        assert_eq!(rules.match_domain("gitlab.com", "/"), Some("Development"));
    }

    #[test]
    fn test_empty_rule_set() {
        let rules = RuleSet::empty().with_path_rule("/Recipes", "Cooking");
        assert_eq!(rules.match_path("/recipes/soup"), Some("Cooking"));
        assert_eq!(rules.match_domain("github.com", "/"), None);
    }
}
