// ABOUTME: Deploy items and the deploy sequence.
// ABOUTME: Assembles a non-empty item set, confirms, and sends it to the set-config command.

use nonempty::NonEmpty;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use super::{Coordinator, Pipeline};
use crate::error::{Error, Result};
use crate::invoke::{InvokeOptions, Invoker, SET_CONFIG, require, run_command};

/// Kinds of payload a deploy can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemCategory {
    Style,
    Terms,
    Bot,
    ModelsPack,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Style,
        ItemCategory::Terms,
        ItemCategory::Bot,
        ItemCategory::ModelsPack,
    ];

    /// Key of the item in the set-config argument.
    pub fn key(&self) -> &'static str {
        match self {
            ItemCategory::Style => "style",
            ItemCategory::Terms => "terms",
            ItemCategory::Bot => "bot",
            ItemCategory::ModelsPack => "modelsPack",
        }
    }

    /// File name (without extension) the item is loaded from.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ItemCategory::Style => "style",
            ItemCategory::Terms => "terms",
            ItemCategory::Bot => "bot",
            ItemCategory::ModelsPack => "models-pack",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which categories a deploy request asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeploySelection {
    pub style: bool,
    pub terms: bool,
    pub bot: bool,
    pub models_pack: bool,
    pub all: bool,
}

impl DeploySelection {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Selected categories in canonical order; selecting nothing is an error.
    pub fn categories(&self) -> Result<NonEmpty<ItemCategory>> {
        let selected: Vec<ItemCategory> = ItemCategory::ALL
            .into_iter()
            .filter(|category| {
                self.all
                    || match category {
                        ItemCategory::Style => self.style,
                        ItemCategory::Terms => self.terms,
                        ItemCategory::Bot => self.bot,
                        ItemCategory::ModelsPack => self.models_pack,
                    }
            })
            .collect();

        NonEmpty::from_vec(selected).ok_or_else(|| {
            Error::invalid_input("nothing to deploy: select at least one of --style, --terms, --bot, --models-pack, or --all")
        })
    }
}

/// Supplies the payload for a category.
pub trait ItemSource {
    fn load(&self, category: ItemCategory) -> Result<Value>;
}

/// Loads `<dir>/<stem>.json`, `.yml`, or `.yaml`.
pub struct ProjectItemSource {
    dir: PathBuf,
}

impl ProjectItemSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ItemSource for ProjectItemSource {
    fn load(&self, category: ItemCategory) -> Result<Value> {
        for ext in ["json", "yml", "yaml"] {
            let path = self.dir.join(format!("{}.{ext}", category.file_stem()));
            if !path.is_file() {
                continue;
            }
            tracing::debug!(path = %path.display(), %category, "loading deploy item");
            let content = std::fs::read_to_string(&path)?;
            let value = if ext == "json" {
                serde_json::from_str(&content)?
            } else {
                serde_yaml::from_str(&content)?
            };
            return Ok(value);
        }

        Err(Error::not_found(
            category.key(),
            format!(
                "no {stem}.json, {stem}.yml, or {stem}.yaml in {}",
                self.dir.display(),
                stem = category.file_stem()
            ),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeployItem {
    pub category: ItemCategory,
    pub payload: Value,
}

/// At least one item, in canonical category order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployItems(NonEmpty<DeployItem>);

impl DeployItems {
    pub fn assemble(selection: &DeploySelection, source: &dyn ItemSource) -> Result<Self> {
        let categories = selection.categories()?;
        let load = |category: ItemCategory| -> Result<DeployItem> {
            Ok(DeployItem {
                category,
                payload: source.load(category)?,
            })
        };
        let head = load(categories.head)?;
        let tail = categories
            .tail
            .iter()
            .map(|category| load(*category))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(NonEmpty { head, tail }))
    }

    pub fn categories(&self) -> Vec<ItemCategory> {
        self.0.iter().map(|item| item.category).collect()
    }

    /// The set-config argument: one member per item, keyed by category.
    pub fn to_argument(&self) -> Value {
        let members: Map<String, Value> = self
            .0
            .iter()
            .map(|item| (item.category.key().to_string(), item.payload.clone()))
            .collect();
        Value::Object(members)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeployRequest {
    pub selection: DeploySelection,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    pub categories: Vec<ItemCategory>,
    pub dry_run: bool,
    /// Result of the set-config command; `None` on a dry run.
    pub result: Option<Value>,
}

#[derive(Default)]
struct DeployContext {
    items: Option<DeployItems>,
    result: Option<Value>,
}

impl DeployContext {
    fn items(&self) -> Result<&DeployItems> {
        self.items
            .as_ref()
            .ok_or_else(|| Error::invalid_input("deploy items were not assembled"))
    }
}

fn describe(categories: &[ItemCategory]) -> String {
    categories
        .iter()
        .map(ItemCategory::key)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Coordinator<'_> {
    /// Validate the selection, confirm unless dry-running, then apply the
    /// items through the set-config command.
    pub async fn deploy(
        &self,
        invoker: &dyn Invoker,
        request: &DeployRequest,
        source: &dyn ItemSource,
        options: InvokeOptions,
    ) -> Result<DeployReport> {
        let this = *self;
        let dry_run = request.dry_run;
        let selection = request.selection;

        let ctx = Pipeline::new("deploy")
            .task("Validate deploy items", move |mut ctx: DeployContext| async move {
                ctx.items = Some(DeployItems::assemble(&selection, source)?);
                Ok::<_, Error>(ctx)
            })
            .task_when(dry_run, "Show deploy plan", move |ctx: DeployContext| async move {
                let items = ctx.items()?;
                this.output.progress(&format!(
                    "Dry run: would send {} to `{SET_CONFIG}` on {} ({:?})",
                    describe(&items.categories()),
                    this.stack,
                    invoker.target()
                ));
                Ok::<_, Error>(ctx)
            })
            .task_when(!dry_run && !options.pre_approved, "Confirm deployment", move |ctx: DeployContext| async move {
                let prompt = format!(
                    "Deploy {} to {}?",
                    describe(&ctx.items()?.categories()),
                    this.stack
                );
                require(this.confirm, &prompt).await?;
                Ok::<_, Error>(ctx)
            })
            .task_when(!dry_run, "Apply configuration", move |mut ctx: DeployContext| async move {
                let argument = ctx.items()?.to_argument();
                let approved = InvokeOptions {
                    pre_approved: true,
                    ..options
                };
                ctx.result = Some(run_command(invoker, SET_CONFIG, &argument, &approved).await?);
                Ok::<_, Error>(ctx)
            })
            .run(DeployContext::default(), self.output)
            .await?;

        Ok(DeployReport {
            categories: ctx.items()?.categories(),
            dry_run,
            result: ctx.result,
        })
    }
}
