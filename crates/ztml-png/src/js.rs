/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The decoder fragments that run the browser's PNG path in reverse:
//! build an `Image` over the payload bytes, draw it to a canvas, and read
//! the bits back out of the red channel.

use ztml_core::vars::JsVars;

/// Wrap the byte array in a `Blob` and point a fresh `Image` at it.
pub fn image_from_bytes(vars: &JsVars) -> String {
    let image = &vars.image;
    let bytes = &vars.bytes;
    format!(
        "{image}=new Image\n{image}.src=URL.createObjectURL(new Blob([{bytes}],{{type:'image/png'}}))\n"
    )
}

/// Point a fresh `Image` at a base64 data URL; the base64 text itself rides
/// in the payload literal so the minifier keeps its hands off it.
pub fn image_from_base64(vars: &JsVars) -> String {
    let image = &vars.image;
    let payload = &vars.payload;
    format!("{image}=new Image\n{image}.src='data:image/png;base64,'+{payload}\n")
}

/// Decode the image, draw it, and recover `bit_count` bits into the bit
/// array; `after` runs inside the `.then` continuation once the bits exist.
///
/// The `>>7` turns any off-by-one rendering noise in the red byte back into
/// a clean bit.
pub fn image_data(bit_count: usize, after: &str, vars: &JsVars) -> String {
    let image = &vars.image;
    let bits = &vars.bits;
    let bytes = &vars.bytes;
    format!(
        "{image}.decode().then(()=>{{\n\
         c=document.createElement('canvas')\n\
         x=c.getContext('2d')\n\
         c=[c.width,c.height]=[{image}.width,{image}.height]\n\
         x.imageSmoothingEnabled=0\n\
         x.drawImage({image},0,0)\n\
         {bytes}=x.getImageData(0,0,...c).data\n\
         {bits}=Array({bit_count})\n\
         for(j=0;j<{bit_count};){bits}[j]={bytes}[j++*4]>>7\n\
         {after}}})",
        after = after.trim()
    )
}
