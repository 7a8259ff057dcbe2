//! The `#[component]` attribute.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat, Token, Visibility,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[component]` macro.
pub(crate) struct ComponentArgs {
    pub injectable: bool,
    pub properties: Option<Ident>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut injectable = false;
        let mut properties = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "injectable" => injectable = true,
                "properties" => {
                    input.parse::<Token![=]>()?;
                    properties = Some(input.parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ComponentArgs {
            injectable,
            properties,
        })
    }
}

/// One invocable method.
struct Method<'a> {
    item: &'a ImplItemFn,
    params: Vec<(String, &'a syn::Type)>,
}

impl<'a> Method<'a> {
    fn parse(item: &'a ImplItemFn) -> syn::Result<Option<Self>> {
        if !matches!(item.vis, Visibility::Public(_)) {
            return Ok(None);
        }
        match item.sig.receiver() {
            Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            _ => return Ok(None),
        }
        if !item.sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &item.sig.generics,
                "component methods cannot be generic",
            ));
        }

        let params = item
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(pat_type),
                FnArg::Receiver(_) => None,
            })
            .map(|pat_type| {
                let name = match &*pat_type.pat {
                    Pat::Ident(pat) => pat.ident.to_string().trim_start_matches("r#").to_owned(),
                    _ => String::new(),
                };
                (name, &*pat_type.ty)
            })
            .collect();

        Ok(Some(Self { item, params }))
    }

    fn name(&self) -> &Ident {
        &self.item.sig.ident
    }

    fn signature(&self) -> TokenStream2 {
        let name = LitStr::new(&self.name().to_string(), self.name().span());
        let params = self.params.iter().map(|(param, _)| param);
        quote! {
            ::kiln::MethodSignature {
                name: #name,
                params: &[#(#params),*],
            }
        }
    }

    fn dispatch_arm(&self) -> TokenStream2 {
        let ident = self.name();
        let name = LitStr::new(&ident.to_string(), ident.span());
        let bindings: Vec<_> = (0..self.params.len())
            .map(|i| format_ident!("__arg{}", i))
            .collect();
        let decodes = self.params.iter().enumerate().map(|(i, (_, ty))| {
            let binding = &bindings[i];
            quote! {
                let #binding: #ty =
                    <#ty as ::kiln::FromArgument>::from_argument(&__args, #i, __method)?;
            }
        });
        let call = if self.item.sig.asyncness.is_some() {
            quote! { self.#ident(#(#bindings),*).await }
        } else {
            quote! { self.#ident(#(#bindings),*) }
        };

        quote! {
            #name => {
                #(#decodes)*
                let __output = #call;
                ::kiln::IntoOutput::into_output(__output).map_err(::kiln::InvokeError::Handler)
            }
        }
    }
}

/// Implementation of the `#[component]` macro.
pub fn component_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ComponentArgs);
    let input = parse_macro_input!(item as ItemImpl);

    match expand(&args, &input) {
        Ok(generated) => TokenStream::from(quote! {
            #input
            #generated
        }),
        Err(err) => {
            let err = err.to_compile_error();
            TokenStream::from(quote! {
                #input
                #err
            })
        }
    }
}

fn expand(args: &ComponentArgs, input: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[component] must be placed on an inherent impl block",
        ));
    }

    let methods = input
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(method) => Some(method),
            _ => None,
        })
        .map(Method::parse)
        .filter_map(Result::transpose)
        .collect::<syn::Result<Vec<_>>>()?;

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let signatures = methods.iter().map(Method::signature);
    let arms = methods.iter().map(Method::dispatch_arm);

    let configurable = match &args.properties {
        Some(field) => quote! {
            impl #impl_generics ::kiln::Configurable for #self_ty #where_clause {
                fn properties(&self) -> ::core::option::Option<&::kiln::Properties> {
                    ::core::option::Option::Some(&self.#field)
                }
            }
        },
        None => quote! {
            impl #impl_generics ::kiln::Configurable for #self_ty #where_clause {}
        },
    };

    let injectable = args.injectable.then(|| {
        quote! {
            impl #impl_generics ::kiln::Injectable for #self_ty #where_clause {
                fn inject(
                    _resolver: &mut ::kiln::Resolver<'_>,
                ) -> ::core::result::Result<Self, ::kiln::ResolutionError> {
                    ::core::result::Result::Ok(<Self as ::core::default::Default>::default())
                }
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::kiln::Component for #self_ty #where_clause {
            fn invoke<'__a>(
                &'__a self,
                __method: &'__a str,
                __args: ::kiln::Arguments,
            ) -> ::kiln::__private::BoxFuture<
                '__a,
                ::core::result::Result<::kiln::__private::Value, ::kiln::InvokeError>,
            > {
                ::std::boxed::Box::pin(async move {
                    match __method {
                        #(#arms)*
                        _ => ::core::result::Result::Err(::kiln::InvokeError::UnknownMethod {
                            component: ::core::any::type_name::<Self>(),
                            method: ::std::string::ToString::to_string(__method),
                        }),
                    }
                })
            }

            fn signatures() -> &'static [::kiln::MethodSignature] {
                &[#(#signatures),*]
            }
        }

        #configurable
        #injectable
    })
}
