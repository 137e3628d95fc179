use clap::{Parser, Subcommand};
use log::{error, info};
use luyview::datamodel::{Element, EntityGraph};
use luyview::logging::init_logging;
use luyview::metamodel::{Feature, FeatureKind, TypeExpression};
use luyview::rule::{find_operator, Evaluatable, Filter, Group, OperatorId, Rule, RuleValue};
use luyview::{
    session_label, DirectorySource, FilteredAndSortedView, MessageBus, SessionStore, SortOrder,
    ViewerConfig,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the viewer configuration file
    #[arg(short, long, default_value = luyview::constants::DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available sessions
    Sessions,
    /// List the types of a session with their element counts
    Types {
        #[arg(required = true)]
        session: String,
    },
    /// Print the filtered and sorted elements of one type
    Show {
        #[arg(required = true)]
        session: String,
        /// Persistent or display name of the type
        #[arg(required = true)]
        type_name: String,
        /// Sort key as FEATURE[:asc|desc]; later keys take precedence
        #[arg(long)]
        sort: Vec<String>,
        /// Feature to leave out of the output
        #[arg(long)]
        hide: Vec<String>,
        /// Keep elements whose FEATURE contains TEXT; enumeration literals
        /// and interface directions are given as a comma-separated list
        #[arg(long, value_name = "FEATURE=TEXT")]
        contains: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ViewerConfig::load_or_default(&cli.config)?;
    init_logging(config.level_filter()?);
    info!("Using data directory {}", config.data_dir.display());

    let source = Arc::new(DirectorySource::new(&config.data_dir)?);
    let store = Arc::new(SessionStore::new(source, config.load_options()));

    match cli.command {
        Commands::Sessions => handle_sessions(&store)?,
        Commands::Types { session } => {
            let graph = store.load_async(session).await?;
            handle_types(&graph);
        }
        Commands::Show {
            session,
            type_name,
            sort,
            hide,
            contains,
        } => {
            let graph = store.load_async(session).await?;
            handle_show(graph, &type_name, &sort, &hide, &contains).await?;
        }
    }
    Ok(())
}

fn handle_sessions(store: &SessionStore) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = store.list_sessions()?;
    if sessions.is_empty() {
        println!("No sessions found");
    }
    for session in sessions {
        println!("{}\t{}", session, session_label(&session));
    }
    Ok(())
}

fn handle_types(graph: &EntityGraph) {
    let metamodel = graph.metamodel();
    println!("Substantial types:");
    for type_expression in metamodel.substantial_types() {
        print_type_line(graph, type_expression);
    }
    println!("Relationship types:");
    for type_expression in metamodel.relationship_types() {
        print_type_line(graph, type_expression);
    }
}

fn print_type_line(graph: &EntityGraph, type_expression: &TypeExpression) {
    println!(
        "  {}\t{}\t{}",
        type_expression.persistent_name,
        type_expression.name,
        graph.elements_of(type_expression).len()
    );
}

async fn handle_show(
    graph: Arc<EntityGraph>,
    type_name: &str,
    sort: &[String],
    hide: &[String],
    contains: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let metamodel = graph.metamodel();
    let type_expression = metamodel
        .type_expression(type_name)
        .or_else(|| {
            metamodel
                .substantial_types()
                .into_iter()
                .chain(metamodel.relationship_types())
                .find(|t| t.name == type_name)
        })
        .cloned()
        .ok_or_else(|| format!("Unknown type '{}'", type_name))?;

    let view = Arc::new(FilteredAndSortedView::new(
        Arc::clone(&graph),
        Arc::new(MessageBus::new()),
    ));

    for key in sort {
        let (name, order) = match key.split_once(':') {
            Some((name, "asc")) => (name, SortOrder::Ascending),
            Some((name, "desc")) => (name, SortOrder::Descending),
            Some((_, other)) => return Err(format!("Unknown sort order '{}'", other).into()),
            None => (key.as_str(), SortOrder::Ascending),
        };
        let feature = lookup_feature(&type_expression, name)?;
        view.sort(&type_expression, &feature, order);
    }

    for name in hide {
        let feature = lookup_feature(&type_expression, name)?;
        if !view.hide_feature(&type_expression, &feature) {
            eprintln!("Feature '{}' cannot be hidden", name);
        }
    }

    if !contains.is_empty() {
        let mut root = Group::and();
        for condition in contains {
            let (name, text) = condition
                .split_once('=')
                .ok_or_else(|| format!("Expected FEATURE=TEXT, got '{}'", condition))?;
            let feature = lookup_feature(&type_expression, name)?;
            let operator = find_operator(OperatorId::Contains, &feature)
                .ok_or_else(|| format!("Feature '{}' does not support contains", name))?;
            let value = RuleValue::parse_for(&feature, text).ok_or_else(|| {
                format!("'{}' is not a valid {} value for '{}'", text, feature.kind, name)
            })?;
            let rule = Rule::new(feature, operator, Some(value))?;
            if !rule.is_valid() {
                return Err(format!("Cannot filter '{}' by '{}'", name, text).into());
            }
            root.add_child(rule);
        }
        view.set_filter(Filter::with_group(Arc::clone(&type_expression), root));
    }

    let (sender, receiver) = tokio::sync::oneshot::channel();
    view.spawn_filtered_and_sorted(Arc::clone(&type_expression), move |result| {
        let _ = sender.send(result);
    })
    .await?;
    let elements = receiver.await??;

    let features = view.ordered_features(&type_expression);
    let header: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
    println!("{}", header.join("\t"));
    for element in elements.iter() {
        let cells: Vec<String> = features
            .iter()
            .map(|feature| render_cell(&graph, element, feature))
            .collect();
        println!("{}", cells.join("\t"));
    }
    info!("{} of {} elements shown", elements.len(), graph.elements_of(&type_expression).len());
    Ok(())
}

fn lookup_feature(
    type_expression: &TypeExpression,
    name: &str,
) -> Result<Arc<Feature>, Box<dyn std::error::Error>> {
    type_expression
        .feature(name)
        .or_else(|| type_expression.features.iter().find(|f| f.name == name))
        .cloned()
        .ok_or_else(|| {
            error!("No feature '{}' on '{}'", name, type_expression.persistent_name);
            format!("Unknown feature '{}'", name).into()
        })
}

fn render_cell(graph: &EntityGraph, element: &Element, feature: &Feature) -> String {
    let name = feature.persistent_name.as_str();
    match feature.kind {
        FeatureKind::Enumeration => element
            .literals(name)
            .iter()
            .map(|literal| literal.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        FeatureKind::Relation | FeatureKind::SelfRelation => graph
            .related(element, name)
            .map(|related| related.label().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => element
            .value(name)
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}
