use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Wraps `main` in orchestrator setup/teardown: logs entry and exit, and
/// guarantees a shutdown line is emitted even when the body returns an
/// error, mirroring the lifecycle hook the teacher used to wrap the ROS
/// node around the solver's `main`.
#[proc_macro_attribute]
pub fn with_node(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    let vis = &input_fn.vis;
    let fn_name = &input_fn.sig.ident;
    let block = &input_fn.block;
    let asyncness = &input_fn.sig.asyncness;
    let output = &input_fn.sig.output;
    let inputs = &input_fn.sig.inputs;

    let expanded = if asyncness.is_some() {
        quote! {
            #vis async fn #fn_name(#inputs) #output {
                log::info!("orchestrator starting up");
                let result = (|| async move { #block })().await;
                match &result {
                    Ok(_) => log::info!("orchestrator shut down cleanly"),
                    Err(error) => log::error!("orchestrator shut down with an error: {error}"),
                }
                result
            }
        }
    } else {
        quote! {
            #vis fn #fn_name(#inputs) #output {
                log::info!("orchestrator starting up");
                let result = (|| { #block })();
                match &result {
                    Ok(_) => log::info!("orchestrator shut down cleanly"),
                    Err(error) => log::error!("orchestrator shut down with an error: {error}"),
                }
                result
            }
        }
    };

    TokenStream::from(expanded)
}
