//! Named queries with a single `{param}` placeholder.

/// A parameterized query.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    /// Whether the query contains a `{param}` placeholder.
    pub takes_param: bool,
    pub query: &'static str,
}

const PLACEHOLDER: &str = "{param}";

impl Template {
    /// Substitute the parameter. The value is inserted verbatim: quotes or
    /// backslashes in it change the query text.
    pub fn render(&self, param: &str) -> String {
        if param.contains(['"', '\\', '}']) {
            tracing::warn!(
                template = self.name,
                "Parameter contains characters that alter the query text"
            );
        }
        self.query.replace(PLACEHOLDER, param)
    }
}

pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.name == name)
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "all_persons",
        description: "All persons with affiliation and summary",
        takes_param: false,
        query: r#"
SELECT ?name ?affiliation ?summary
WHERE {
    ?person a :Person ;
            :name ?name .
    OPTIONAL { ?person :affiliatedWith ?org . ?org :name ?affiliation }
    OPTIONAL { ?person :summary ?summary }
}
ORDER BY ?name
"#,
    },
    Template {
        name: "person_meetings",
        description: "Meetings with a person (param: name)",
        takes_param: true,
        query: r#"
SELECT ?date ?summary
WHERE {
    ?person a :Person ;
            :name ?name .
    FILTER(CONTAINS(LCASE(STR(?name)), LCASE("{param}")))
    ?meeting a :Meeting ;
             :participant ?person ;
             :date ?date .
    OPTIONAL { ?meeting :summary ?summary }
}
ORDER BY DESC(?date)
"#,
    },
    Template {
        name: "person_topics",
        description: "Topics discussed with a person (param: name)",
        takes_param: true,
        query: r#"
SELECT DISTINCT ?topic_name ?date
WHERE {
    ?person a :Person ;
            :name ?name .
    FILTER(CONTAINS(LCASE(STR(?name)), LCASE("{param}")))
    ?meeting :participant ?person ;
             :date ?date ;
             :hasTopic ?topic .
    ?topic :name ?topic_name .
}
ORDER BY DESC(?date)
"#,
    },
    Template {
        name: "meetings_by_date",
        description: "Person meetings in a period (param: YYYY-MM or YYYY)",
        takes_param: true,
        query: r#"
SELECT ?person_name ?date ?summary
WHERE {
    ?meeting a :Meeting ;
             :participant ?person ;
             :date ?date .
    ?person :name ?person_name .
    FILTER(STRSTARTS(STR(?date), "{param}"))
    OPTIONAL { ?meeting :summary ?summary }
}
ORDER BY DESC(?date)
"#,
    },
    Template {
        name: "org_members",
        description: "Persons affiliated with an organization (param: organization)",
        takes_param: true,
        query: r#"
SELECT ?name ?summary
WHERE {
    ?org a :Organization ;
         :name ?org_name .
    FILTER(CONTAINS(LCASE(STR(?org_name)), LCASE("{param}")))
    ?person :affiliatedWith ?org ;
            :name ?name .
    OPTIONAL { ?person :summary ?summary }
}
ORDER BY ?name
"#,
    },
    Template {
        name: "person_network",
        description: "Persons a person knows (param: name)",
        takes_param: true,
        query: r#"
SELECT ?related_name
WHERE {
    ?person a :Person ;
            :name ?name .
    FILTER(CONTAINS(LCASE(STR(?name)), LCASE("{param}")))
    ?person :knows ?related .
    ?related :name ?related_name .
}
ORDER BY ?related_name
"#,
    },
    Template {
        name: "recent_meetings",
        description: "Ten most recent person meetings",
        takes_param: false,
        query: r#"
SELECT ?person_name ?date ?summary
WHERE {
    ?meeting a :Meeting ;
             :participant ?person ;
             :date ?date .
    ?person :name ?person_name .
    OPTIONAL { ?meeting :summary ?summary }
}
ORDER BY DESC(?date)
LIMIT 10
"#,
    },
    Template {
        name: "stats",
        description: "Entity counts per type",
        takes_param: false,
        query: r#"
SELECT
    (COUNT(DISTINCT ?person) AS ?persons)
    (COUNT(DISTINCT ?project) AS ?projects)
    (COUNT(DISTINCT ?meeting) AS ?meetings)
    (COUNT(DISTINCT ?org) AS ?organizations)
    (COUNT(DISTINCT ?topic) AS ?topics)
WHERE {
    { ?person a :Person }
    UNION { ?project a :Project }
    UNION { ?meeting a :Meeting }
    UNION { ?org a :Organization }
    UNION { ?topic a :Topic }
}
"#,
    },
    Template {
        name: "search_keyword",
        description: "Person meetings whose excerpt mentions a keyword (param: keyword)",
        takes_param: true,
        query: r#"
SELECT ?person_name ?date ?summary
WHERE {
    ?meeting a :Meeting ;
             :participant ?person ;
             :date ?date ;
             :summary ?summary .
    ?person :name ?person_name .
    FILTER(CONTAINS(LCASE(STR(?summary)), LCASE("{param}")))
}
ORDER BY DESC(?date)
"#,
    },
    Template {
        name: "all_projects",
        description: "All projects, newest first",
        takes_param: false,
        query: r#"
SELECT ?name ?date ?summary
WHERE {
    ?project a :Project ;
             :name ?name .
    OPTIONAL { ?project :date ?date }
    OPTIONAL { ?project :summary ?summary }
}
ORDER BY DESC(?date) ?name
"#,
    },
    Template {
        name: "active_projects",
        description: "Projects not tagged archived",
        takes_param: false,
        query: r#"
SELECT ?name ?date ?summary
WHERE {
    ?project a :Project ;
             :name ?name .
    OPTIONAL { ?project :date ?date }
    OPTIONAL { ?project :summary ?summary }
    FILTER NOT EXISTS { ?project :tag "archived"@en }
}
ORDER BY DESC(?date) ?name
"#,
    },
    Template {
        name: "archived_projects",
        description: "Projects tagged archived",
        takes_param: false,
        query: r#"
SELECT ?name ?date ?summary
WHERE {
    ?project a :Project ;
             :name ?name ;
             :tag "archived"@en .
    OPTIONAL { ?project :date ?date }
    OPTIONAL { ?project :summary ?summary }
}
ORDER BY DESC(?date) ?name
"#,
    },
    Template {
        name: "project_details",
        description: "Date, summary and tags of a project (param: project name)",
        takes_param: true,
        query: r#"
SELECT ?name ?date ?summary ?tag
WHERE {
    ?project a :Project ;
             :name ?name .
    FILTER(CONTAINS(LCASE(STR(?name)), LCASE("{param}")))
    OPTIONAL { ?project :date ?date }
    OPTIONAL { ?project :summary ?summary }
    OPTIONAL { ?project :tag ?tag }
}
ORDER BY ?name ?tag
"#,
    },
    Template {
        name: "project_meetings",
        description: "Dated log entries of a project (param: project name)",
        takes_param: true,
        query: r#"
SELECT ?date ?summary
WHERE {
    ?project a :Project ;
             :name ?pname .
    FILTER(CONTAINS(LCASE(STR(?pname)), LCASE("{param}")))
    ?meeting :relatedTo ?project ;
             :date ?date .
    OPTIONAL { ?meeting :summary ?summary }
}
ORDER BY DESC(?date)
"#,
    },
    Template {
        name: "project_participants",
        description: "Persons involved in a project (param: project name)",
        takes_param: true,
        query: r#"
SELECT DISTINCT ?person_name
WHERE {
    ?project a :Project ;
             :name ?pname .
    FILTER(CONTAINS(LCASE(STR(?pname)), LCASE("{param}")))
    ?person :involvedIn ?project ;
            :name ?person_name .
}
ORDER BY ?person_name
"#,
    },
    Template {
        name: "person_projects",
        description: "Projects a person is involved in (param: name)",
        takes_param: true,
        query: r#"
SELECT DISTINCT ?project_name ?date
WHERE {
    ?person a :Person ;
            :name ?name .
    FILTER(CONTAINS(LCASE(STR(?name)), LCASE("{param}")))
    ?person :involvedIn ?project .
    ?project :name ?project_name .
    OPTIONAL { ?project :date ?date }
}
ORDER BY DESC(?date) ?project_name
"#,
    },
    Template {
        name: "search_projects",
        description: "Projects whose name or summary mentions a keyword (param: keyword)",
        takes_param: true,
        query: r#"
SELECT ?name ?date ?summary
WHERE {
    ?project a :Project ;
             :name ?name .
    OPTIONAL { ?project :date ?date }
    OPTIONAL { ?project :summary ?summary }
    FILTER(
        CONTAINS(LCASE(STR(?name)), LCASE("{param}")) ||
        CONTAINS(LCASE(STR(?summary)), LCASE("{param}"))
    )
}
ORDER BY DESC(?date) ?name
"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::vocab;
    use oxigraph::sparql::Query;

    #[test]
    fn test_every_template_parses() {
        for template in TEMPLATES {
            let text = template.render("x");
            assert!(
                Query::parse(&format!("{}{}", vocab::sparql_prologue(), text), None).is_ok(),
                "template {} does not parse",
                template.name
            );
            assert_eq!(template.takes_param, template.query.contains(PLACEHOLDER));
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = TEMPLATES.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TEMPLATES.len());
        assert_eq!(TEMPLATES.len(), 17);
    }

    #[test]
    fn test_render_is_verbatim() {
        let template = find("person_meetings").unwrap();
        let text = template.render("조쉬");
        assert!(text.contains(r#"LCASE("조쉬")"#));
        assert!(!text.contains(PLACEHOLDER));
        assert!(find("nope").is_none());
    }
}
