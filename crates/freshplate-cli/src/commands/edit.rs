use std::path::Path;

use freshplate_core::edit::{EditState, NAVIGATE_AFTER_SUCCESS};
use freshplate_core::models::LocalImage;
use freshplate_core::RecipeField;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::cli::EditArgs;
use crate::commands::common::{load_recipe, notification_line, AppContext, HttpEditController};
use crate::error::CliError;

pub async fn run_edit(args: &EditArgs, context: &AppContext) -> Result<(), CliError> {
    let (controller, mut routes) = context.edit_controller(&args.id)?;
    let renderer = tokio::spawn(render_updates(controller.subscribe()));

    let outcome = apply_and_submit(&controller, args).await;
    let route = if outcome.is_ok() {
        // Keep the success message up until the controller navigates away.
        timeout(NAVIGATE_AFTER_SUCCESS * 2, routes.recv())
            .await
            .ok()
            .flatten()
    } else {
        None
    };

    drop(controller);
    if let Err(error) = renderer.await {
        tracing::debug!("Notification renderer stopped: {}", error);
    }

    outcome?;
    if let Some(route) = route {
        println!("Returning to {route}");
    }
    Ok(())
}

/// Flags given on the command line, in form order.
pub fn field_edits(args: &EditArgs) -> Vec<(RecipeField, String)> {
    [
        (RecipeField::Title, &args.title),
        (RecipeField::Ingredients, &args.ingredients),
        (RecipeField::Instructions, &args.instructions),
        (RecipeField::Preptime, &args.preptime),
        (RecipeField::Cooktime, &args.cooktime),
        (RecipeField::Servings, &args.servings),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
    .collect()
}

pub fn read_local_image(path: &Path) -> Result<LocalImage, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok(LocalImage::new(file_name, None, bytes)?)
}

async fn apply_and_submit(controller: &HttpEditController, args: &EditArgs) -> Result<(), CliError> {
    load_recipe(controller).await?;

    for (field, value) in field_edits(args) {
        controller.set_field(field, value)?;
    }
    if let Some(path) = args.image.as_deref() {
        controller.select_image(read_local_image(path)?)?;
    } else if args.delete_image {
        controller.delete_image()?;
    }

    // The failure itself reaches the user through the error notification.
    controller
        .submit()
        .await
        .map(|_| ())
        .map_err(|_| CliError::SubmitFailed)
}

async fn render_updates(mut updates: watch::Receiver<EditState>) {
    let mut last_line = None;
    let mut was_submitting = false;
    while updates.changed().await.is_ok() {
        let (line, submitting) = {
            let state = updates.borrow_and_update();
            (notification_line(&state.notification), state.is_submitting())
        };
        if submitting && !was_submitting {
            println!("Saving recipe...");
        }
        was_submitting = submitting;
        if line != last_line {
            if let Some(text) = &line {
                println!("{text}");
            }
        }
        last_line = line;
    }
}
