use std::path::Path;

use pocket_planner::cache::Cache;
use pocket_planner::client::Client;
use pocket_planner::EventQuery;
use pocket_planner::Provider;

#[tokio::main]
async fn main() {
    // This is just a function to silence "unused function" warning
    env_logger::init();

    let client = Client::from_config().unwrap();
    let cache = Cache::new(Path::new("pocket-planner-data"));
    let provider = Provider::detect(client, cache).await;
    println!("Running in {:?} mode", provider.mode());

    let tasks = provider.tasks().await.unwrap();
    pocket_planner::utils::print_task_list(&tasks);

    let events = provider.events(&EventQuery::default()).await.unwrap();
    pocket_planner::utils::print_event_list(&events);
}
