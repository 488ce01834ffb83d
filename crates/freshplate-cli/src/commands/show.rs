use crate::commands::common::{format_recipe_lines, load_recipe, recipe_view, AppContext};
use crate::error::CliError;

pub async fn run_show(recipe_id: &str, as_json: bool, context: &AppContext) -> Result<(), CliError> {
    let (controller, _routes) = context.edit_controller(recipe_id)?;
    load_recipe(&controller).await?;

    let state = controller.state();
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recipe_view(recipe_id, &state))?
        );
    } else {
        for line in format_recipe_lines(&state) {
            println!("{line}");
        }
    }

    Ok(())
}
