//! Log in, ask who we are, page through revisions and provoke an API error.

use anyhow::Context;
use futures::{StreamExt, TryStreamExt};
use mwapi::{cli, logger, params, Config, Document, Error, Session};

const USER_AGENT: &str = "mwapi demo script";
const TITLE: &str = "User_talk:EpochFail";
const REVISION_LIMIT: usize = 55;
const BATCH: usize = 50;

/// Every revision of every page in a `prop=revisions` response.
fn revisions(doc: &Document) -> Vec<&serde_json::Value> {
    doc["query"]["pages"]
        .as_object()
        .into_iter()
        .flat_map(|pages| pages.values())
        .filter_map(|page| page["revisions"].as_array())
        .flatten()
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logger::init().context("initialize logger")?;

    match dotenv::dotenv() {
        Ok(path) => log::info!("loaded .env from {}", path.display()),
        Err(err) => log::warn!("couldn't load .env file: {:?}", err),
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(_) => Config::new("https://en.wikipedia.org").user_agent(USER_AGENT),
    };
    let session = Session::new(config).context("create session")?;

    let username = cli::login(&session, cli::Terminal, "English Wikipedia").await?;
    log::info!("logged in as {}", username);

    let whoami = session
        .get(params! { "action" => "query", "meta" => "userinfo" })
        .await
        .context("whoami")?;
    println!("whoami?\n\t{}\n", whoami);

    // stop paging once we have enough
    println!("Querying by title");
    let rev_ids = session
        .get_continued(params! {
            "action" => "query",
            "prop" => "revisions",
            "titles" => TITLE,
            "rvprop" => "ids",
            "rvlimit" => BATCH,
        })
        .map_ok(|doc| {
            let ids = revisions(&doc)
                .into_iter()
                .filter_map(|rev| rev["revid"].as_u64())
                .collect::<Vec<_>>();
            futures::stream::iter(ids.into_iter().map(Ok::<_, Error>))
        })
        .try_flatten()
        .take(REVISION_LIMIT)
        .try_collect::<Vec<_>>()
        .await
        .context("query revisions by title")?;
    println!("\tfound {} revisions\n", rev_ids.len());

    println!("Querying by rev_id");
    for batch in rev_ids.chunks(BATCH) {
        let doc = session
            .post(params! {
                "action" => "query",
                "prop" => "revisions",
                "revids" => batch,
            })
            .await
            .context("query revisions by id")?;
        for rev in revisions(&doc) {
            println!("\t{} {}", rev["revid"], rev["comment"]);
        }
    }
    println!();

    println!("Query with an error");
    match session
        .get(params! {
            "action" => "query",
            "prop" => "revisions",
            "revids" => vec![123523],
            "rvlimit" => 2,
        })
        .await
    {
        Err(err @ Error::Api { .. }) => println!("\tAn API error was caught.\n\t{}", err),
        Err(err) => return Err(err).context("query with an error"),
        Ok(doc) => println!("\tno error after all: {}", doc),
    }

    session.logout().await.context("log out")?;
    Ok(())
}
